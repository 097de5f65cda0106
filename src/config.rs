//! Client configuration.
//!
//! One [`ClientConfig`] is built per app session and shared by the API
//! client, the search pipelines, and the label cache. Values come from
//! `Default`, `with_*` builders, or `from_env()` (which loads a `.env` if
//! present).

use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Public Wikidata action API endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://www.wikidata.org/w/api.php";

/// Identify ourselves per the Wikimedia user-agent policy.
pub const DEFAULT_USER_AGENT: &str = "wikidata-explorer/0.1 (contact@example.com)";

/// Minimum gap between requests (~10 req/sec, well under API guidelines).
const REQUEST_GAP_MS: u64 = 100;

/// Quiet period after the last keystroke before a suggestion request fires.
const SUGGEST_DEBOUNCE_MS: u64 = 150;

/// Server-imposed cap on ids per `wbgetentities` call.
pub const MAX_IDS_PER_REQUEST: usize = 50;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Action API endpoint (`.../w/api.php`).
    pub api_endpoint: Url,
    /// Preferred language for labels, descriptions, and search.
    pub language: String,
    /// User-agent sent with every request.
    pub user_agent: String,
    /// Transport timeout.
    pub timeout: Duration,
    /// Minimum gap enforced between consecutive requests.
    pub request_gap: Duration,
    /// Debounce before a live-typing suggestion request is issued.
    pub suggest_debounce: Duration,
    /// Result cap for suggestion requests.
    pub suggest_limit: usize,
    /// Page size for explicit searches (and the "load more" stride).
    pub search_page_size: usize,
    /// Ids per label-fetch batch, capped at [`MAX_IDS_PER_REQUEST`].
    pub label_batch_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: Url::parse(DEFAULT_API_ENDPOINT).expect("default endpoint is valid"),
            language: "en".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            request_gap: Duration::from_millis(REQUEST_GAP_MS),
            suggest_debounce: Duration::from_millis(SUGGEST_DEBOUNCE_MS),
            suggest_limit: 20,
            search_page_size: 50,
            label_batch_size: MAX_IDS_PER_REQUEST,
        }
    }
}

impl ClientConfig {
    /// Build from environment variables, loading `.env` first if present.
    ///
    /// Recognized: `WIKIDATA_API_URL`, `WIKIDATA_LANGUAGE`,
    /// `WIKIDATA_USER_AGENT`. Anything unset keeps its default.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("WIKIDATA_API_URL") {
            config.api_endpoint = Url::parse(&endpoint)
                .with_context(|| format!("WIKIDATA_API_URL is not a valid URL: {endpoint}"))?;
        }
        if let Ok(language) = std::env::var("WIKIDATA_LANGUAGE") {
            if !language.trim().is_empty() {
                config.language = language;
            }
        }
        if let Ok(user_agent) = std::env::var("WIKIDATA_USER_AGENT") {
            if !user_agent.trim().is_empty() {
                config.user_agent = user_agent;
            }
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.api_endpoint = endpoint;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_suggest_debounce(mut self, debounce: Duration) -> Self {
        self.suggest_debounce = debounce;
        self
    }

    pub fn with_suggest_limit(mut self, limit: usize) -> Self {
        self.suggest_limit = limit.max(1);
        self
    }

    pub fn with_search_page_size(mut self, size: usize) -> Self {
        self.search_page_size = size.max(1);
        self
    }

    pub fn with_label_batch_size(mut self, size: usize) -> Self {
        self.label_batch_size = size.clamp(1, MAX_IDS_PER_REQUEST);
        self
    }

    /// Language fallback chain sent to the API: configured language plus
    /// English, deduplicated.
    pub fn languages_param(&self) -> String {
        if self.language == "en" {
            "en".to_string()
        } else {
            format!("{}|en", self.language)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ClientConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.search_page_size, 50);
        assert_eq!(config.label_batch_size, MAX_IDS_PER_REQUEST);
        assert_eq!(config.suggest_debounce, Duration::from_millis(150));
        assert_eq!(config.api_endpoint.as_str(), DEFAULT_API_ENDPOINT);
    }

    #[test]
    fn builders_clamp_to_usable_ranges() {
        let config = ClientConfig::default()
            .with_label_batch_size(500)
            .with_search_page_size(0)
            .with_suggest_limit(0);
        assert_eq!(config.label_batch_size, MAX_IDS_PER_REQUEST);
        assert_eq!(config.search_page_size, 1);
        assert_eq!(config.suggest_limit, 1);
    }

    #[test]
    fn languages_param_appends_english_fallback() {
        let config = ClientConfig::default().with_language("de");
        assert_eq!(config.languages_param(), "de|en");
        let config = ClientConfig::default();
        assert_eq!(config.languages_param(), "en");
    }
}
