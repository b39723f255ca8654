//! Locale type: a validated member of the supported set.

use crate::i18n::registry::{Direction, LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A supported locale.
///
/// Only codes present in the [`LocaleRegistry`] can be turned into a `Locale`,
/// so holding one is proof of membership in the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    pub const ENGLISH: Locale = Locale { code: "en" };

    pub const ARABIC: Locale = Locale { code: "ar" };

    /// Strict lookup: fails for anything outside the supported set.
    pub fn from_code(code: &str) -> Result<Locale> {
        match LocaleRegistry::get().get_by_code(code) {
            Some(config) => Ok(Locale { code: config.code }),
            None => bail!("Unsupported locale code: '{}'", code),
        }
    }

    /// Lenient lookup: unsupported codes are coerced to the fallback locale.
    pub fn normalize(code: &str) -> Locale {
        Self::from_code(code).unwrap_or_else(|_| Self::fallback())
    }

    pub fn fallback() -> Locale {
        Locale {
            code: LocaleRegistry::get().fallback().code,
        }
    }

    /// All supported locales in registry order.
    pub fn all() -> Vec<Locale> {
        LocaleRegistry::get()
            .list()
            .iter()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    /// Locale after this one when cycling through the supported set.
    pub fn next(&self) -> Locale {
        Locale {
            code: LocaleRegistry::get().next_after(self.code).code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// # Panics
    /// Never in practice: a `Locale` can only be built from a registry code.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be registered")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn direction(&self) -> Direction {
        self.config().direction
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}
