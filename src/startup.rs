//! Page startup sequence.
//!
//! Order matters: the document gets its `lang`/`dir` before anything else,
//! strings are painted before the animation engine first measures the page,
//! and only then is the engine initialized.

use crate::animation::{AnimationConfig, AnimationEngine, ANIMATION_ATTR, ANIMATION_ATTR_ALIAS};
use crate::dom::SharedDocument;
use crate::i18n::{LanguageController, Locale, SwitchOptions, SwitchOutcome};
use tracing::{debug, info};

/// What startup did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    pub initial: Locale,
    pub outcome: SwitchOutcome,
    pub aliases_fixed: usize,
}

/// Rewrite misspelled animation attributes to the canonical name.
pub fn fix_animation_attribute_alias(doc: &SharedDocument) -> usize {
    let fixed = doc.with(|doc| doc.rename_attr(ANIMATION_ATTR_ALIAS, ANIMATION_ATTR));
    if fixed > 0 {
        debug!(
            "Rewrote {} '{}' attribute(s) to '{}'",
            fixed, ANIMATION_ATTR_ALIAS, ANIMATION_ATTR
        );
    }
    fixed
}

/// Run the full startup sequence. Must be called exactly once per page.
pub async fn bootstrap(
    doc: &SharedDocument,
    controller: &LanguageController,
    animation: &dyn AnimationEngine,
    animation_config: &AnimationConfig,
    env_signal: Option<&str>,
) -> StartupReport {
    let aliases_fixed = fix_animation_attribute_alias(doc);

    let initial = controller.initialize(env_signal);
    let outcome = controller
        .set_language(initial.code(), SwitchOptions::initial_load())
        .await;

    animation.init(animation_config);
    info!(
        "Page ready in '{}' ({:?})",
        controller.current(),
        outcome
    );

    StartupReport {
        initial,
        outcome,
        aliases_fixed,
    }
}
