use std::time::Duration;

use crate::error::{Result, StorefrontError};

use super::env::{read_env_u64, read_env_usize, read_non_empty_env};

const ENV_SEARCH_SERVER: &str = "STOREFRONT_SEARCH_SERVER";
const ENV_SOLR_URL: &str = "STOREFRONT_SOLR_URL";
const ENV_ELASTICSEARCH_URL: &str = "STOREFRONT_ELASTICSEARCH_URL";
const ENV_ELASTICSEARCH_INDEX: &str = "STOREFRONT_ELASTICSEARCH_INDEX";
const ENV_SEARCH_TIMEOUT_MS: &str = "STOREFRONT_SEARCH_TIMEOUT_MS";
const ENV_SEARCH_MAX_RESULTS: &str = "STOREFRONT_SEARCH_MAX_RESULTS";

const DEFAULT_SOLR_URL: &str = "http://localhost:8983/solr/esa";
const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";
const DEFAULT_ELASTICSEARCH_INDEX: &str = "openstorefront";
const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SEARCH_MAX_RESULTS: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchBackend {
    #[default]
    Solr,
    Elasticsearch,
}

impl SearchBackend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solr => "solr",
            Self::Elasticsearch => "elasticsearch",
        }
    }

    pub(crate) fn parse(raw: Option<&str>) -> Result<Self> {
        let normalized = raw.map(|value| value.trim().to_ascii_lowercase());
        match normalized.as_deref() {
            None | Some("solr") => Ok(Self::Solr),
            Some("elasticsearch") => Ok(Self::Elasticsearch),
            Some(other) => Err(StorefrontError::Validation(format!(
                "invalid {ENV_SEARCH_SERVER}: {other} (expected solr|elasticsearch)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub backend: SearchBackend,
    pub solr_url: String,
    pub elasticsearch_url: String,
    pub elasticsearch_index: String,
    pub timeout: Duration,
    pub max_results: usize,
}

impl SearchConfig {
    pub(super) fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            backend: SearchBackend::parse(std::env::var(ENV_SEARCH_SERVER).ok().as_deref())?,
            solr_url: read_non_empty_env(ENV_SOLR_URL).unwrap_or(defaults.solr_url),
            elasticsearch_url: read_non_empty_env(ENV_ELASTICSEARCH_URL)
                .unwrap_or(defaults.elasticsearch_url),
            elasticsearch_index: read_non_empty_env(ENV_ELASTICSEARCH_INDEX)
                .unwrap_or(defaults.elasticsearch_index),
            timeout: Duration::from_millis(read_env_u64(
                ENV_SEARCH_TIMEOUT_MS,
                DEFAULT_SEARCH_TIMEOUT_MS,
                1,
            )),
            max_results: read_env_usize(ENV_SEARCH_MAX_RESULTS, defaults.max_results, 1),
        })
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::Solr,
            solr_url: DEFAULT_SOLR_URL.to_string(),
            elasticsearch_url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            elasticsearch_index: DEFAULT_ELASTICSEARCH_INDEX.to_string(),
            timeout: Duration::from_millis(DEFAULT_SEARCH_TIMEOUT_MS),
            max_results: DEFAULT_SEARCH_MAX_RESULTS,
        }
    }
}
