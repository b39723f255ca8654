use crate::i18n::Locale;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Translated strings for exactly one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    locale: Locale,
    entries: HashMap<String, String>,
}

impl Dictionary {
    pub fn new(locale: Locale, entries: HashMap<String, String>) -> Self {
        Self { locale, entries }
    }

    /// Build a dictionary from a flat JSON object.
    ///
    /// `null` values count as missing keys. Numbers and booleans are kept as
    /// their JSON text. Nested arrays and objects cannot be painted as text
    /// and are skipped.
    pub fn from_json(locale: Locale, value: Value) -> Result<Self, serde_json::Error> {
        let object: serde_json::Map<String, Value> = serde_json::from_value(value)?;
        let mut entries = HashMap::with_capacity(object.len());

        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(text) => {
                    entries.insert(key, text);
                }
                Value::Number(_) | Value::Bool(_) => {
                    entries.insert(key, value.to_string());
                }
                Value::Array(_) | Value::Object(_) => {
                    warn!("Skipping non-scalar entry '{}' in {} dictionary", key, locale);
                }
            }
        }

        Ok(Self { locale, entries })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
