//! Page chrome that reacts to user input: busy spinner, scroll-aware header
//! and the slide-out sidebar.

use crate::animation::AnimationEngine;
use crate::dom::{NodeId, SharedDocument};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const SPINNER_ID: &str = "langSpinner";
pub const HEADER_ID: &str = "siteHeader";
pub const SIDEBAR_ID: &str = "sidebar";
pub const OPEN_SIDEBAR_ID: &str = "openSidebar";
pub const CLOSE_SIDEBAR_ID: &str = "closeSidebar";
pub const LANG_TOGGLE_ID: &str = "langToggle";
pub const LANG_SHORT_ID: &str = "langShort";

const SPINNER_ACTIVE_CLASS: &str = "active";
const SIDEBAR_OPEN_ATTR: &str = "data-open";

/// Busy indicator shown while a dictionary loads.
#[derive(Debug, Clone)]
pub struct Spinner {
    doc: SharedDocument,
}

impl Spinner {
    pub fn new(doc: SharedDocument) -> Self {
        Self { doc }
    }

    pub fn activate(&self) {
        self.set_active(true);
    }

    pub fn deactivate(&self) {
        self.set_active(false);
    }

    /// Deactivate after `delay` on a background task.
    pub fn release_after(&self, delay: Duration) {
        let spinner = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            spinner.deactivate();
        });
    }

    pub fn is_active(&self) -> bool {
        self.doc.with(|doc| {
            doc.by_id_mut(SPINNER_ID)
                .is_some_and(|el| el.has_class(SPINNER_ACTIVE_CLASS))
        })
    }

    fn set_active(&self, active: bool) {
        self.doc.with(|doc| {
            if let Some(el) = doc.by_id_mut(SPINNER_ID) {
                el.toggle_class(SPINNER_ACTIVE_CLASS, active);
            }
        });
    }
}

/// Restyles the header as the page scrolls. Runs on every scroll tick, so it
/// only toggles classes.
#[derive(Debug, Clone)]
pub struct HeaderObserver {
    doc: SharedDocument,
    threshold_px: u32,
}

impl HeaderObserver {
    pub fn new(doc: SharedDocument, threshold_px: u32) -> Self {
        Self { doc, threshold_px }
    }

    pub fn on_scroll(&self, scroll_y: f64) {
        let opaque = scroll_y > f64::from(self.threshold_px);
        self.doc.with(|doc| {
            let Some(header) = doc.by_id_mut(HEADER_ID) else {
                return;
            };
            header.toggle_class("bg-white", opaque);
            header.toggle_class("shadow-lg", opaque);
            header.toggle_class("backdrop-blur", !opaque);
            header.toggle_class("bg-white/70", !opaque);
        });
    }
}

/// Slide-out navigation panel.
#[derive(Clone)]
pub struct Sidebar {
    doc: SharedDocument,
    animation: Arc<dyn AnimationEngine>,
}

impl Sidebar {
    pub fn new(doc: SharedDocument, animation: Arc<dyn AnimationEngine>) -> Self {
        Self { doc, animation }
    }

    pub fn is_open(&self) -> bool {
        self.doc.with(|doc| {
            doc.by_id_mut(SIDEBAR_ID)
                .is_some_and(|el| el.has_attr(SIDEBAR_OPEN_ATTR))
        })
    }

    pub fn open(&self) {
        self.set_open(true);
    }

    pub fn close(&self) {
        self.set_open(false);
    }

    pub fn toggle(&self) {
        self.set_open(!self.is_open());
    }

    /// Route a click on `target`. Returns whether the sidebar handled it.
    pub fn handle_click(&self, target: NodeId) -> bool {
        enum Action {
            Toggle,
            Close,
        }

        let actions = self.doc.with(|doc| {
            let mut actions = Vec::new();
            if doc.closest_id(target, OPEN_SIDEBAR_ID).is_some() {
                actions.push(Action::Toggle);
            }
            if doc.closest_id(target, CLOSE_SIDEBAR_ID).is_some() {
                actions.push(Action::Close);
            }
            let on_link = doc.get(target).is_some_and(|el| el.tag == "a");
            let in_sidebar = doc
                .by_id(SIDEBAR_ID)
                .is_some_and(|sidebar| doc.is_within(target, sidebar));
            if on_link && in_sidebar {
                actions.push(Action::Close);
            }
            actions
        });

        for action in &actions {
            match action {
                Action::Toggle => self.toggle(),
                Action::Close => self.close(),
            }
        }
        !actions.is_empty()
    }

    fn set_open(&self, open: bool) {
        let changed = self.doc.with(|doc| {
            let Some(sidebar) = doc.by_id_mut(SIDEBAR_ID) else {
                return false;
            };
            if open {
                sidebar
                    .attributes
                    .insert(SIDEBAR_OPEN_ATTR.to_string(), "true".to_string());
            } else {
                sidebar.attributes.remove(SIDEBAR_OPEN_ATTR);
            }
            true
        });

        if changed {
            debug!("Sidebar {}", if open { "opened" } else { "closed" });
            self.animation.refresh_layout();
        }
    }
}
