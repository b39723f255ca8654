//! Event wiring for a page: routes browser-style events to the language
//! controller, sidebar, header observer and animation engine.

use crate::animation::{AnimationConfig, AnimationEngine};
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::dom::{NodeId, SharedDocument};
use crate::i18n::{
    DictionarySource, LanguageController, LocaleStore, PreferenceStorage, SwitchOptions,
    SwitchOutcome,
};
use crate::startup::{self, StartupReport};
use crate::ui::{HeaderObserver, Sidebar, LANG_SHORT_ID, LANG_TOGGLE_ID};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    DomContentLoaded { scroll_y: f64 },
    Click { target: NodeId },
    Scroll { y: f64 },
    WindowLoad,
    Resize,
}

pub struct PageApp {
    doc: SharedDocument,
    controller: Arc<LanguageController>,
    animation: Arc<dyn AnimationEngine>,
    animation_config: AnimationConfig,
    header: HeaderObserver,
    sidebar: Sidebar,
    resize: Debouncer,
    env_signal: Option<String>,
    started: AtomicBool,
    ready: AtomicBool,
}

impl PageApp {
    pub fn new(
        doc: SharedDocument,
        source: Arc<dyn DictionarySource>,
        storage: Box<dyn PreferenceStorage>,
        animation: Arc<dyn AnimationEngine>,
        config: &Config,
    ) -> Self {
        let controller = LanguageController::new(
            doc.clone(),
            source,
            LocaleStore::new(storage),
            Arc::clone(&animation),
        )
        .with_spinner_release_delay(config.spinner_release_delay);

        let resize = {
            let animation = Arc::clone(&animation);
            Debouncer::new(config.resize_debounce, move || animation.refresh_layout())
        };

        Self {
            header: HeaderObserver::new(doc.clone(), config.header_threshold_px),
            sidebar: Sidebar::new(doc.clone(), Arc::clone(&animation)),
            doc,
            controller: Arc::new(controller),
            animation,
            animation_config: AnimationConfig::default(),
            resize,
            env_signal: config.language_signal(),
            started: AtomicBool::new(false),
            ready: AtomicBool::new(false),
        }
    }

    pub fn with_animation_config(mut self, config: AnimationConfig) -> Self {
        self.animation_config = config;
        self
    }

    pub fn controller(&self) -> &LanguageController {
        &self.controller
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    /// Whether startup has finished and all listeners are live.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub async fn handle(&self, event: UiEvent) -> Option<SwitchOutcome> {
        match event {
            UiEvent::DomContentLoaded { scroll_y } => {
                self.start(scroll_y).await.map(|report| report.outcome)
            }
            UiEvent::Click { target } => self.on_click(target).await,
            UiEvent::Scroll { y } => {
                self.on_scroll(y);
                None
            }
            UiEvent::WindowLoad => {
                self.on_window_load();
                None
            }
            UiEvent::Resize => {
                self.on_resize();
                None
            }
        }
    }

    /// Startup. Returns `None` if the page was already started.
    pub async fn start(&self, scroll_y: f64) -> Option<StartupReport> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Page already started, ignoring DOMContentLoaded");
            return None;
        }

        self.header.on_scroll(scroll_y);

        let report = startup::bootstrap(
            &self.doc,
            &self.controller,
            self.animation.as_ref(),
            &self.animation_config,
            self.env_signal.as_deref(),
        )
        .await;

        self.ready.store(true, Ordering::SeqCst);
        Some(report)
    }

    pub async fn on_click(&self, target: NodeId) -> Option<SwitchOutcome> {
        if !self.started.load(Ordering::SeqCst) {
            return None;
        }
        self.sidebar.handle_click(target);

        if !self.is_ready() {
            return None;
        }
        let on_toggle = self
            .doc
            .with(|doc| doc.closest_id(target, LANG_TOGGLE_ID).is_some());
        if !on_toggle {
            return None;
        }

        let next = self.controller.current().next();
        self.doc.with(|doc| {
            if let Some(short) = doc.by_id_mut(LANG_SHORT_ID) {
                short.text = next.next().code().to_uppercase();
            }
        });

        let outcome = self
            .controller
            .set_language(next.code(), SwitchOptions::with_spinner())
            .await;
        self.animation.refresh_layout();
        Some(outcome)
    }

    pub fn on_scroll(&self, y: f64) {
        if self.started.load(Ordering::SeqCst) {
            self.header.on_scroll(y);
        }
    }

    /// Images and fonts finished loading; positions may have shifted.
    pub fn on_window_load(&self) {
        if self.is_ready() {
            self.animation.refresh_layout();
        }
    }

    pub fn on_resize(&self) {
        if self.is_ready() {
            self.resize.call();
        }
    }
}
