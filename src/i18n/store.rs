//! Locale store: resolves the initial locale and persists the user's choice.

use crate::i18n::{Locale, LocaleRegistry};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Storage key for the persisted preference.
pub const PREFERENCE_KEY: &str = "lang";

/// Client-local key-value storage.
///
/// Writes are best effort: implementations log failures instead of returning
/// them, since losing a preference must never break navigation.
pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Ephemeral storage, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.set(key, value);
        storage
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

/// Storage backed by a single JSON object file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> HashMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!("Failed to read preferences from {}: {}", self.path.display(), e);
                return HashMap::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring malformed preferences file {}: {}", self.path.display(), e);
            HashMap::new()
        })
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());

        let result = serde_json::to_string_pretty(&values)
            .map_err(std::io::Error::from)
            .and_then(|json| std::fs::write(&self.path, json));

        if let Err(e) = result {
            warn!("Failed to persist preferences to {}: {}", self.path.display(), e);
        }
    }
}

/// Reads and writes the locale preference.
pub struct LocaleStore {
    storage: Box<dyn PreferenceStorage>,
}

impl LocaleStore {
    pub fn new(storage: Box<dyn PreferenceStorage>) -> Self {
        Self { storage }
    }

    /// Locale to start the session with.
    ///
    /// A persisted preference wins; an unsupported one resolves to the
    /// fallback without consulting the environment. With nothing persisted,
    /// the environment signal (e.g. "ar-EG") selects the first non-fallback
    /// locale whose code it starts with, case-insensitively. Anything else
    /// yields the fallback.
    pub fn resolve_initial_locale(&self, env_signal: Option<&str>) -> Locale {
        if let Some(saved) = self.storage.get(PREFERENCE_KEY) {
            let locale = Locale::normalize(&saved);
            debug!("Using persisted locale preference '{}' as '{}'", saved, locale);
            return locale;
        }

        let signal = env_signal.unwrap_or_default().to_lowercase();
        let matched = LocaleRegistry::get()
            .list()
            .iter()
            .filter(|config| !config.is_fallback)
            .find(|config| signal.starts_with(config.code));

        match matched {
            Some(config) => Locale::normalize(config.code),
            None => Locale::fallback(),
        }
    }

    pub fn persisted(&self) -> Option<String> {
        self.storage.get(PREFERENCE_KEY)
    }

    pub fn persist(&self, locale: Locale) {
        self.storage.set(PREFERENCE_KEY, locale.code());
    }
}
