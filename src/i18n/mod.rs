//! Runtime language switching.
//!
//! # Architecture
//!
//! - `registry`: supported locales, their direction and the fallback designation
//! - `language`: `Locale`, a value that is always a member of the supported set
//! - `dictionary`: translated strings for one locale
//! - `store`: initial locale resolution and the persisted preference
//! - `fetcher`: loads dictionaries over HTTP
//! - `painter`: writes dictionaries and `lang`/`dir` into the document
//! - `controller`: the switching state machine tying the above together
//!
//! # Example
//!
//! ```rust,ignore
//! let controller = LanguageController::new(doc, source, store, animation);
//! let initial = controller.initialize(Some("ar-EG"));
//! controller.set_language(initial.code(), SwitchOptions::initial_load()).await;
//! ```

mod controller;
mod dictionary;
mod fetcher;
mod language;
pub mod painter;
mod registry;
mod store;

pub use controller::{LanguageController, SwitchOptions, SwitchOutcome, SwitchState};
pub use dictionary::Dictionary;
pub use fetcher::{DictionarySource, FetchError, HttpDictionaryFetcher};
pub use language::Locale;
pub use registry::{Direction, LocaleConfig, LocaleRegistry};
pub use store::{FileStorage, LocaleStore, MemoryStorage, PreferenceStorage, PREFERENCE_KEY};
