use crate::i18n::{Dictionary, Locale};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a dictionary could not be loaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("dictionary request for '{locale}' returned HTTP {status}")]
    Status { locale: Locale, status: u16 },

    #[error("dictionary request for '{locale}' failed: {source}")]
    Transport {
        locale: Locale,
        #[source]
        source: reqwest::Error,
    },

    #[error("dictionary for '{locale}' is not a flat JSON object: {reason}")]
    Parse { locale: Locale, reason: String },
}

/// Anything that can produce the dictionary for a locale.
#[async_trait]
pub trait DictionarySource: Send + Sync {
    async fn fetch_dictionary(&self, locale: Locale) -> Result<Dictionary, FetchError>;
}

/// Loads `<base_url>/i18n/<code>.json` over HTTP, bypassing caches.
#[derive(Debug, Clone)]
pub struct HttpDictionaryFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDictionaryFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dictionary_url(&self, locale: Locale) -> String {
        format!("{}/i18n/{}.json", self.base_url, locale.code())
    }
}

#[async_trait]
impl DictionarySource for HttpDictionaryFetcher {
    async fn fetch_dictionary(&self, locale: Locale) -> Result<Dictionary, FetchError> {
        let locale = Locale::normalize(locale.code());
        let url = self.dictionary_url(locale);
        debug!("Fetching dictionary from {}", url);

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|source| FetchError::Transport { locale, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                locale,
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| FetchError::Parse {
            locale,
            reason: e.to_string(),
        })?;

        Dictionary::from_json(locale, body).map_err(|e| FetchError::Parse {
            locale,
            reason: e.to_string(),
        })
    }
}
