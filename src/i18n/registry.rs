//! Locale registry: single source of truth for the supported locale set.
//!
//! The registry is immutable reference data. It uses `OnceLock` so every
//! caller sees the same table without passing it around.

use std::sync::OnceLock;

/// Text direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    /// Value for the document `dir` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// ISO 639-1 code, also the dictionary file stem (e.g. "en", "ar")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    pub direction: Direction,

    /// Substituted for unsupported requests and used as the retry target
    /// when a dictionary fails to load. Exactly one entry sets this.
    pub is_fallback: bool,
}

pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Exact, case-sensitive lookup by code.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// Supported locales in declaration order.
    pub fn list(&self) -> &[LocaleConfig] {
        &self.locales
    }

    /// # Panics
    /// Panics if the table does not contain exactly one fallback entry.
    pub fn fallback(&self) -> &LocaleConfig {
        let fallbacks: Vec<_> = self.locales.iter().filter(|l| l.is_fallback).collect();

        match fallbacks.len() {
            0 => panic!("No fallback locale found in registry"),
            1 => fallbacks[0],
            _ => panic!("Multiple fallback locales found in registry"),
        }
    }

    /// Supported locale following `code` in declaration order, wrapping around.
    pub fn next_after(&self, code: &str) -> &LocaleConfig {
        let index = self
            .locales
            .iter()
            .position(|l| l.code == code)
            .map(|i| (i + 1) % self.locales.len())
            .unwrap_or(0);
        &self.locales[index]
    }
}

fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            direction: Direction::Ltr,
            is_fallback: true,
        },
        LocaleConfig {
            code: "ar",
            name: "Arabic",
            direction: Direction::Rtl,
            is_fallback: false,
        },
    ]
}
