use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Dictionary resource
    pub base_url: String,
    pub fetch_timeout: Duration,

    // Persisted preference
    pub preference_file: PathBuf,

    // Environment language signal override (falls back to the OS locale)
    pub browser_language: Option<String>,

    // UI timings
    pub spinner_release_delay: Duration,
    pub resize_debounce: Duration,
    pub header_threshold_px: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            fetch_timeout: Duration::from_secs(10),
            preference_file: PathBuf::from(".page-i18n.json"),
            browser_language: None,
            spinner_release_delay: Duration::from_millis(500),
            resize_debounce: Duration::from_millis(200),
            header_threshold_px: 24,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            base_url: std::env::var("PAGE_I18N_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            fetch_timeout: Duration::from_secs(
                env_number("PAGE_I18N_FETCH_TIMEOUT_SECS")?.unwrap_or(10),
            ),

            preference_file: std::env::var("PAGE_I18N_PREFERENCE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.preference_file),

            browser_language: std::env::var("PAGE_I18N_BROWSER_LANGUAGE")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            spinner_release_delay: Duration::from_millis(
                env_number("PAGE_I18N_SPINNER_RELEASE_MS")?.unwrap_or(500),
            ),
            resize_debounce: Duration::from_millis(
                env_number("PAGE_I18N_RESIZE_DEBOUNCE_MS")?.unwrap_or(200),
            ),
            header_threshold_px: env_number("PAGE_I18N_HEADER_THRESHOLD_PX")?
                .unwrap_or(defaults.header_threshold_px),
        })
    }

    /// Language signal reported by the environment, e.g. "ar-EG".
    pub fn language_signal(&self) -> Option<String> {
        self.browser_language.clone().or_else(sys_locale::get_locale)
    }
}

/// Parse an optional numeric variable into `T`, rejecting out-of-range values.
fn env_number<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| {
                format!("{} must be a non-negative integer in range, got '{}'", name, raw)
            }),
        Err(_) => Ok(None),
    }
}
