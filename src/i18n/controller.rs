//! Language controller: the fetch → paint → commit → notify state machine.
//!
//! # Flow
//!
//! ```text
//! Idle(cur) --set_language(x)--> Switching(cur -> x)
//!     Switching --ok-->   Idle(x)
//!     Switching --fail--> Recovering(cur, failed x) --ok/fail--> Idle(fallback) | Idle(cur)
//! ```
//!
//! Retrying is a single explicit step: a failure while loading the fallback
//! locale is swallowed and leaves the last committed state in place.
//!
//! Overlapping calls are not queued. Each call takes a request token and a
//! dictionary that arrives for an older token is dropped, so the most recent
//! request is the one that commits. A no-op call back to the committed locale
//! also invalidates a pending switch, except while the first paint is pending.

use crate::animation::AnimationEngine;
use crate::dom::SharedDocument;
use crate::i18n::{painter, Dictionary, DictionarySource, Locale, LocaleStore};
use crate::ui::Spinner;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchOptions {
    /// Show the busy spinner while the dictionary loads.
    pub with_spinner: bool,
    /// First paint of the session: hide translatable nodes until painted.
    pub initial_load: bool,
}

impl SwitchOptions {
    pub fn initial_load() -> Self {
        Self {
            with_spinner: false,
            initial_load: true,
        }
    }

    pub fn with_spinner() -> Self {
        Self {
            with_spinner: true,
            initial_load: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Idle(Locale),
    Switching { from: Locale, to: Locale },
    Recovering { from: Locale, failed: Locale },
}

/// How a `set_language` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Target was already committed; nothing fetched.
    Unchanged,
    Committed(Locale),
    /// Target failed to load and the fallback locale is now committed.
    FellBack { requested: Locale, committed: Locale },
    /// Both the target and the fallback failed; nothing changed.
    Failed,
    /// A newer call was issued while this one awaited the network.
    Superseded,
}

#[derive(Debug)]
struct Session {
    current: Locale,
    state: SwitchState,
    latest_token: u64,
    /// Translatable nodes are hidden and waiting for a paint.
    reveal_pending: bool,
}

pub struct LanguageController {
    doc: SharedDocument,
    source: Arc<dyn DictionarySource>,
    store: LocaleStore,
    animation: Arc<dyn AnimationEngine>,
    spinner: Spinner,
    spinner_release_delay: Duration,
    session: Mutex<Session>,
}

impl LanguageController {
    pub fn new(
        doc: SharedDocument,
        source: Arc<dyn DictionarySource>,
        store: LocaleStore,
        animation: Arc<dyn AnimationEngine>,
    ) -> Self {
        let fallback = Locale::fallback();
        Self {
            spinner: Spinner::new(doc.clone()),
            doc,
            source,
            store,
            animation,
            spinner_release_delay: Duration::from_millis(500),
            session: Mutex::new(Session {
                current: fallback,
                state: SwitchState::Idle(fallback),
                latest_token: 0,
                reveal_pending: false,
            }),
        }
    }

    pub fn with_spinner_release_delay(mut self, delay: Duration) -> Self {
        self.spinner_release_delay = delay;
        self
    }

    /// Resolve the session's starting locale and stamp the document's
    /// `lang`/`dir` right away, before any dictionary is loaded.
    pub fn initialize(&self, env_signal: Option<&str>) -> Locale {
        let initial = self.store.resolve_initial_locale(env_signal);
        {
            let mut session = self.session();
            session.current = initial;
            session.state = SwitchState::Idle(initial);
        }
        self.doc
            .with(|doc| painter::apply_locale_metadata(doc, initial));
        info!("Initial locale resolved to '{}'", initial);
        initial
    }

    /// Committed locale.
    pub fn current(&self) -> Locale {
        self.session().current
    }

    pub fn state(&self) -> SwitchState {
        self.session().state
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    /// Switch the page to `requested`, coercing unsupported codes to the
    /// fallback locale. Never fails; see [`SwitchOutcome`].
    pub async fn set_language(&self, requested: &str, opts: SwitchOptions) -> SwitchOutcome {
        let target = Locale::normalize(requested);
        if target.code() != requested {
            debug!("Unsupported locale '{}' coerced to '{}'", requested, target);
        }

        let Some((token, from)) = self.begin(target, opts) else {
            if opts.with_spinner {
                self.spinner.deactivate();
            }
            return SwitchOutcome::Unchanged;
        };

        if opts.with_spinner {
            self.spinner.activate();
        }

        let outcome = self.run(token, from, target, opts).await;

        if opts.with_spinner {
            self.spinner.release_after(self.spinner_release_delay);
        }
        outcome
    }

    /// Idempotence guard plus token issue. Returns `None` when the target is
    /// already committed and this is not the initial load.
    fn begin(&self, target: Locale, opts: SwitchOptions) -> Option<(u64, Locale)> {
        let mut session = self.session();
        if target == session.current && !opts.initial_load {
            debug!("Locale '{}' already active, skipping", target);
            if !matches!(session.state, SwitchState::Idle(_)) && !session.reveal_pending {
                // The user came back to the committed locale while another
                // switch was in flight; that switch is now stale.
                session.latest_token += 1;
                session.state = SwitchState::Idle(session.current);
            }
            return None;
        }

        session.latest_token += 1;
        session.state = SwitchState::Switching {
            from: session.current,
            to: target,
        };
        if opts.initial_load {
            self.doc.with(painter::hide_all);
            session.reveal_pending = true;
        }
        Some((session.latest_token, session.current))
    }

    async fn run(&self, token: u64, from: Locale, target: Locale, opts: SwitchOptions) -> SwitchOutcome {
        match self.source.fetch_dictionary(target).await {
            Ok(dict) => {
                return if self.commit(token, &dict) {
                    SwitchOutcome::Committed(target)
                } else {
                    SwitchOutcome::Superseded
                };
            }
            Err(e) => warn!("Failed to load '{}' dictionary: {}", target, e),
        }

        let fallback = Locale::fallback();
        if target == fallback {
            return self.abandon(token);
        }

        {
            let mut session = self.session();
            if session.latest_token != token {
                return SwitchOutcome::Superseded;
            }
            session.state = SwitchState::Recovering {
                from,
                failed: target,
            };
            if fallback == session.current && !opts.initial_load {
                // Fallback content is already what the page shows.
                session.state = SwitchState::Idle(fallback);
                if std::mem::take(&mut session.reveal_pending) {
                    self.doc.with(painter::show_all);
                }
                info!("Staying on fallback locale '{}'", fallback);
                return SwitchOutcome::FellBack {
                    requested: target,
                    committed: fallback,
                };
            }
        }

        info!("Retrying with fallback locale '{}'", fallback);
        match self.source.fetch_dictionary(fallback).await {
            Ok(dict) => {
                if self.commit(token, &dict) {
                    SwitchOutcome::FellBack {
                        requested: target,
                        committed: fallback,
                    }
                } else {
                    SwitchOutcome::Superseded
                }
            }
            Err(e) => {
                warn!("Failed to load fallback '{}' dictionary: {}", fallback, e);
                self.abandon(token)
            }
        }
    }

    /// Paint and commit `dict` if `token` is still the latest request.
    fn commit(&self, token: u64, dict: &Dictionary) -> bool {
        let locale = dict.locale();
        let painted = {
            let mut session = self.session();
            if session.latest_token != token {
                debug!("Dropping stale '{}' dictionary", locale);
                return false;
            }

            let reveal = std::mem::take(&mut session.reveal_pending);
            let painted = self.doc.with(|doc| {
                let painted = painter::paint(doc, dict);
                painter::apply_locale_metadata(doc, locale);
                if reveal {
                    painter::show_all(doc);
                }
                painted
            });

            session.current = locale;
            session.state = SwitchState::Idle(locale);
            painted
        };

        self.store.persist(locale);
        info!(
            "Locale '{}' ({}) committed ({} strings painted)",
            locale,
            locale.name(),
            painted
        );
        self.animation.refresh_layout();
        true
    }

    /// Give up on `token`, keeping the last committed locale.
    fn abandon(&self, token: u64) -> SwitchOutcome {
        let mut session = self.session();
        if session.latest_token != token {
            return SwitchOutcome::Superseded;
        }

        session.state = SwitchState::Idle(session.current);
        if std::mem::take(&mut session.reveal_pending) {
            // Nothing could be loaded; show the authored text rather than a blank page.
            self.doc.with(painter::show_all);
        }
        warn!("Keeping locale '{}' after failed switch", session.current);
        SwitchOutcome::Failed
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationConfig;
    use crate::dom::{Document, Element, I18N_ATTR};
    use crate::i18n::{Dictionary, FetchError, MemoryStorage, PREFERENCE_KEY};
    use crate::ui::SPINNER_ID;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned dictionaries; locales in `failing` return HTTP 500.
    #[derive(Default)]
    struct FakeSource {
        failing: HashSet<&'static str>,
        delays: HashMap<&'static str, Duration>,
        calls: Mutex<Vec<Locale>>,
    }

    impl FakeSource {
        fn failing(codes: &[&'static str]) -> Self {
            Self {
                failing: codes.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Locale> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DictionarySource for FakeSource {
        async fn fetch_dictionary(&self, locale: Locale) -> Result<Dictionary, FetchError> {
            self.calls.lock().unwrap().push(locale);
            if let Some(delay) = self.delays.get(locale.code()) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(locale.code()) {
                return Err(FetchError::Status { locale, status: 500 });
            }
            let title = match locale.code() {
                "ar" => "مرحبا",
                _ => "Hello",
            };
            Ok(Dictionary::new(
                locale,
                HashMap::from([("title".to_string(), title.to_string())]),
            ))
        }
    }

    #[derive(Default)]
    struct CountingAnimation(AtomicUsize);

    impl AnimationEngine for CountingAnimation {
        fn init(&self, _config: &AnimationConfig) {}
        fn refresh_layout(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        doc: SharedDocument,
        source: Arc<FakeSource>,
        animation: Arc<CountingAnimation>,
        controller: LanguageController,
    }

    fn harness(source: FakeSource, saved: Option<&str>) -> Harness {
        let mut doc = Document::new();
        doc.append(Element::new("h1").with_attr(I18N_ATTR, "title").with_text("Source title"));
        doc.append(Element::new("p").with_attr(I18N_ATTR, "untranslated").with_text("Kept"));
        doc.append(Element::new("span").with_id(SPINNER_ID));
        let doc = SharedDocument::new(doc);

        let storage = match saved {
            Some(code) => MemoryStorage::with_value(PREFERENCE_KEY, code),
            None => MemoryStorage::new(),
        };
        let source = Arc::new(source);
        let animation = Arc::new(CountingAnimation::default());
        let controller = LanguageController::new(
            doc.clone(),
            source.clone(),
            LocaleStore::new(Box::new(storage)),
            animation.clone(),
        )
        .with_spinner_release_delay(Duration::from_millis(20));

        Harness {
            doc,
            source,
            animation,
            controller,
        }
    }

    fn title(doc: &SharedDocument) -> String {
        doc.with(|doc| doc.translatable().next().unwrap().text.clone())
    }

    #[tokio::test]
    async fn test_switch_commits_and_paints() {
        let h = harness(FakeSource::default(), None);
        h.controller.initialize(None);

        let outcome = h.controller.set_language("ar", SwitchOptions::default()).await;

        assert_eq!(outcome, SwitchOutcome::Committed(Locale::ARABIC));
        assert_eq!(h.controller.current(), Locale::ARABIC);
        assert_eq!(h.controller.state(), SwitchState::Idle(Locale::ARABIC));
        assert_eq!(title(&h.doc), "مرحبا");
        assert_eq!(h.doc.lock().dir, "rtl");
        assert_eq!(h.controller.store.persisted().as_deref(), Some("ar"));
        assert_eq!(h.animation.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_keys_keep_prior_text() {
        let h = harness(FakeSource::default(), None);
        h.controller.set_language("ar", SwitchOptions::default()).await;

        let texts: Vec<String> = h.doc.with(|doc| doc.translatable().map(|el| el.text.clone()).collect());
        assert_eq!(texts[1], "Kept");
    }

    #[tokio::test]
    async fn test_same_locale_is_noop() {
        let h = harness(FakeSource::default(), None);
        h.controller.initialize(None);

        let outcome = h.controller.set_language("en", SwitchOptions::default()).await;

        assert_eq!(outcome, SwitchOutcome::Unchanged);
        assert!(h.source.calls().is_empty());
        assert_eq!(title(&h.doc), "Source title");
        assert_eq!(h.animation.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_noop_releases_spinner_immediately() {
        let h = harness(FakeSource::default(), None);
        h.controller.spinner().activate();

        let outcome = h.controller.set_language("en", SwitchOptions::with_spinner()).await;

        assert_eq!(outcome, SwitchOutcome::Unchanged);
        assert!(!h.controller.spinner().is_active());
    }

    #[tokio::test]
    async fn test_initial_load_fetches_even_when_current() {
        let h = harness(FakeSource::default(), None);
        h.controller.initialize(None);

        let outcome = h.controller.set_language("en", SwitchOptions::initial_load()).await;

        assert_eq!(outcome, SwitchOutcome::Committed(Locale::ENGLISH));
        assert_eq!(h.source.calls(), vec![Locale::ENGLISH]);
        assert_eq!(title(&h.doc), "Hello");
    }

    #[tokio::test]
    async fn test_unsupported_behaves_like_fallback() {
        let h = harness(FakeSource::default(), None);
        h.controller.set_language("ar", SwitchOptions::default()).await;

        let outcome = h.controller.set_language("fr", SwitchOptions::default()).await;

        assert_eq!(outcome, SwitchOutcome::Committed(Locale::ENGLISH));
        assert_eq!(h.source.calls(), vec![Locale::ARABIC, Locale::ENGLISH]);
        assert_eq!(h.doc.lock().dir, "ltr");
    }

    #[tokio::test]
    async fn test_failure_recovers_to_fallback_on_initial_load() {
        let h = harness(FakeSource::failing(&["ar"]), None);
        let initial = h.controller.initialize(Some("ar-SA"));
        assert_eq!(initial, Locale::ARABIC);

        let outcome = h
            .controller
            .set_language(initial.code(), SwitchOptions::initial_load())
            .await;

        assert_eq!(
            outcome,
            SwitchOutcome::FellBack {
                requested: Locale::ARABIC,
                committed: Locale::ENGLISH
            }
        );
        assert_eq!(h.controller.current(), Locale::ENGLISH);
        assert_eq!(title(&h.doc), "Hello");
        assert_eq!(h.doc.lock().dir, "ltr");
        assert!(h.doc.with(|doc| doc.translatable().all(|el| !el.hidden)));
    }

    #[tokio::test]
    async fn test_failure_when_fallback_already_committed_skips_refetch() {
        let h = harness(FakeSource::failing(&["ar"]), None);
        h.controller.set_language("en", SwitchOptions::initial_load()).await;

        let outcome = h.controller.set_language("ar", SwitchOptions::default()).await;

        assert!(matches!(outcome, SwitchOutcome::FellBack { .. }));
        assert_eq!(h.source.calls(), vec![Locale::ENGLISH, Locale::ARABIC]);
        assert_eq!(h.controller.state(), SwitchState::Idle(Locale::ENGLISH));
        assert_eq!(title(&h.doc), "Hello");
    }

    #[tokio::test]
    async fn test_failed_switch_during_initial_load_reveals_nodes() {
        let source = FakeSource {
            failing: HashSet::from(["ar"]),
            delays: HashMap::from([("en", Duration::from_millis(50))]),
            ..FakeSource::default()
        };
        let h = Arc::new(harness(source, None));
        h.controller.initialize(None);

        let initial = {
            let h = h.clone();
            tokio::spawn(async move {
                h.controller
                    .set_language("en", SwitchOptions::initial_load())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(h.doc.with(|doc| doc.translatable().all(|el| el.hidden)));

        let outcome = h.controller.set_language("ar", SwitchOptions::default()).await;
        assert_eq!(
            outcome,
            SwitchOutcome::FellBack {
                requested: Locale::ARABIC,
                committed: Locale::ENGLISH
            }
        );
        assert!(h.doc.with(|doc| doc.translatable().all(|el| !el.hidden)));

        assert_eq!(initial.await.unwrap(), SwitchOutcome::Superseded);
        assert_eq!(h.controller.state(), SwitchState::Idle(Locale::ENGLISH));
        assert!(h.doc.with(|doc| doc.translatable().all(|el| !el.hidden)));
        assert_eq!(title(&h.doc), "Source title");
    }

    #[tokio::test]
    async fn test_failure_from_arabic_falls_back_to_english() {
        let failing = harness(FakeSource::failing(&["ar"]), Some("ar"));
        failing.controller.initialize(None);
        let outcome = failing.controller.set_language("ar", SwitchOptions::initial_load()).await;

        assert!(matches!(outcome, SwitchOutcome::FellBack { .. }));
        assert_eq!(failing.controller.current(), Locale::ENGLISH);
        assert_eq!(failing.controller.store.persisted().as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_double_failure_leaves_state_untouched() {
        let h = harness(FakeSource::failing(&["ar", "en"]), None);
        h.controller.initialize(None);

        let outcome = h.controller.set_language("ar", SwitchOptions::default()).await;

        assert!(matches!(outcome, SwitchOutcome::FellBack { .. }));
        assert_eq!(h.controller.current(), Locale::ENGLISH);
        assert_eq!(title(&h.doc), "Source title");

        let outcome = h.controller.set_language("en", SwitchOptions::initial_load()).await;
        assert_eq!(outcome, SwitchOutcome::Failed);
        assert_eq!(h.controller.current(), Locale::ENGLISH);
        assert_eq!(title(&h.doc), "Source title");
        assert_eq!(h.animation.0.load(Ordering::SeqCst), 0);
        assert_eq!(h.controller.store.persisted(), None);
    }

    #[tokio::test]
    async fn test_double_failure_on_initial_load_reveals_source_text() {
        let h = harness(FakeSource::failing(&["ar", "en"]), None);
        h.controller.initialize(Some("ar"));

        let outcome = h.controller.set_language("ar", SwitchOptions::initial_load()).await;

        assert_eq!(outcome, SwitchOutcome::Failed);
        assert_eq!(h.source.calls(), vec![Locale::ARABIC, Locale::ENGLISH]);
        assert_eq!(h.controller.current(), Locale::ARABIC);
        assert_eq!(h.controller.state(), SwitchState::Idle(Locale::ARABIC));
        assert!(h.doc.with(|doc| doc.translatable().all(|el| !el.hidden)));
    }

    #[tokio::test]
    async fn test_nodes_hidden_while_initial_fetch_pending() {
        let source = FakeSource {
            delays: HashMap::from([("en", Duration::from_millis(50))]),
            ..FakeSource::default()
        };
        let h = Arc::new(harness(source, None));

        let task = {
            let h = h.clone();
            tokio::spawn(async move {
                h.controller
                    .set_language("en", SwitchOptions::initial_load())
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(h.doc.with(|doc| doc.translatable().all(|el| el.hidden)));
        assert_eq!(
            h.controller.state(),
            SwitchState::Switching {
                from: Locale::ENGLISH,
                to: Locale::ENGLISH
            }
        );

        assert_eq!(task.await.unwrap(), SwitchOutcome::Committed(Locale::ENGLISH));
        assert!(h.doc.with(|doc| doc.translatable().all(|el| !el.hidden)));
    }

    #[tokio::test]
    async fn test_stale_response_is_dropped() {
        let source = FakeSource {
            delays: HashMap::from([("ar", Duration::from_millis(60))]),
            ..FakeSource::default()
        };
        let h = Arc::new(harness(source, None));
        h.controller.set_language("en", SwitchOptions::initial_load()).await;

        let slow = {
            let h = h.clone();
            tokio::spawn(async move { h.controller.set_language("ar", SwitchOptions::default()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(h.controller.state(), SwitchState::Switching { .. }));

        let back = h.controller.set_language("en", SwitchOptions::default()).await;
        assert_eq!(back, SwitchOutcome::Unchanged);
        assert_eq!(h.controller.state(), SwitchState::Idle(Locale::ENGLISH));

        assert_eq!(slow.await.unwrap(), SwitchOutcome::Superseded);
        assert_eq!(h.source.calls(), vec![Locale::ENGLISH, Locale::ARABIC]);
        assert_eq!(h.controller.current(), Locale::ENGLISH);
        assert_eq!(title(&h.doc), "Hello");
        assert_eq!(h.doc.lock().dir, "ltr");
    }

    #[tokio::test]
    async fn test_newer_switch_wins_over_slower_older_one() {
        let source = FakeSource {
            delays: HashMap::from([("en", Duration::from_millis(60))]),
            ..FakeSource::default()
        };
        let h = Arc::new(harness(source, Some("ar")));
        h.controller.initialize(None);

        let slow_en = {
            let h = h.clone();
            tokio::spawn(async move { h.controller.set_language("en", SwitchOptions::default()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let fast = h.controller.set_language("ar", SwitchOptions::initial_load()).await;
        assert_eq!(fast, SwitchOutcome::Committed(Locale::ARABIC));

        assert_eq!(slow_en.await.unwrap(), SwitchOutcome::Superseded);
        assert_eq!(h.controller.current(), Locale::ARABIC);
        assert_eq!(title(&h.doc), "مرحبا");
    }

    #[tokio::test]
    async fn test_spinner_released_after_delay() {
        let h = harness(FakeSource::default(), None);

        let outcome = h.controller.set_language("ar", SwitchOptions::with_spinner()).await;
        assert_eq!(outcome, SwitchOutcome::Committed(Locale::ARABIC));
        assert!(h.controller.spinner().is_active());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!h.controller.spinner().is_active());
    }

    #[tokio::test]
    async fn test_spinner_released_after_failure() {
        let h = harness(FakeSource::failing(&["ar", "en"]), Some("ar"));
        h.controller.initialize(None);

        let outcome = h.controller.set_language("en", SwitchOptions::with_spinner()).await;
        assert_eq!(outcome, SwitchOutcome::Failed);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!h.controller.spinner().is_active());
        assert_eq!(h.controller.current(), Locale::ARABIC);
    }
}
