use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{SearchBackend, SearchConfig};
use crate::error::{Result, StorefrontError};
use crate::models::ComponentSearchView;

use super::{SearchServer, view_from_document};

#[derive(Clone)]
pub struct SolrSearchServer {
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for SolrSearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolrSearchServer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SolrSearchServer {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.solr_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SearchServer for SolrSearchServer {
    fn backend(&self) -> SearchBackend {
        SearchBackend::Solr
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<ComponentSearchView>> {
        let url = format!("{}/select", self.base_url);
        let rows = limit.to_string();
        let resp = self
            .http
            .get(url)
            .query(&[("q", query), ("rows", rows.as_str()), ("wt", "json")])
            .send()?;
        if !resp.status().is_success() {
            return Err(StorefrontError::SearchUnavailable(format!(
                "solr select failed with status {}",
                resp.status()
            )));
        }
        let body = resp.json::<Value>()?;
        Ok(documents_from_response(&body))
    }
}

fn documents_from_response(body: &Value) -> Vec<ComponentSearchView> {
    body.pointer("/response/docs")
        .and_then(Value::as_array)
        .map(|docs| docs.iter().map(view_from_document).collect())
        .unwrap_or_default()
}
