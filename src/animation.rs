//! Reveal-on-scroll animation collaborator.
//!
//! The engine's scheduling is opaque; the page only initializes it once and
//! asks it to re-measure element positions whenever document flow may have
//! changed.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Canonical attribute marking an element for reveal animation.
pub const ANIMATION_ATTR: &str = "data-aos";

/// Misspelling of [`ANIMATION_ATTR`] rewritten once at startup.
pub const ANIMATION_ATTR_ALIAS: &str = "data-aso";

/// Devices on which animations are switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisableOn {
    Never,
    Phone,
    Tablet,
    Mobile,
}

/// Tunables handed to the engine on init.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationConfig {
    #[serde(serialize_with = "as_millis")]
    pub duration: Duration,
    /// Animate only the first time an element enters the viewport.
    pub once: bool,
    /// Play the reverse animation when scrolling back past an element.
    pub mirror: bool,
    /// Trigger offset from the viewport edge, in pixels.
    pub offset: u32,
    pub easing: String,
    pub disable: DisableOn,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(800),
            once: true,
            mirror: false,
            offset: 80,
            easing: "ease-out".to_string(),
            disable: DisableOn::Mobile,
        }
    }
}

/// Capability interface to the animation engine.
///
/// `refresh_layout` may be called any number of times; engines must treat a
/// call before `init` as a no-op.
pub trait AnimationEngine: Send + Sync {
    fn init(&self, config: &AnimationConfig);
    fn refresh_layout(&self);
}

/// Used when no engine is present on the page.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnimation;

impl AnimationEngine for NoopAnimation {
    fn init(&self, _config: &AnimationConfig) {}
    fn refresh_layout(&self) {}
}

/// Engine stand-in that reports calls through `tracing` and counts them.
#[derive(Debug, Default)]
pub struct TracingAnimation {
    initialized: AtomicBool,
    refreshes: AtomicUsize,
}

impl TracingAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Refreshes received after init.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl AnimationEngine for TracingAnimation {
    fn init(&self, config: &AnimationConfig) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Animation engine already initialized, ignoring init");
            return;
        }
        let settings = serde_json::to_string(config).unwrap_or_default();
        info!("Animation engine initialized with {}", settings);
    }

    fn refresh_layout(&self) {
        if !self.is_initialized() {
            debug!("Layout refresh before animation init ignored");
            return;
        }
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Animation layout refreshed ({} so far)", n);
    }
}
