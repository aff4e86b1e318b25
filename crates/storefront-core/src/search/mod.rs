//! Search server capability.
//!
//! The concrete engine (Solr or Elasticsearch) is chosen once from
//! configuration when the manager is built. Both engines hand back plain
//! [`ComponentSearchView`] candidates; relevance scoring happens afterwards
//! and never depends on the engine.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{SearchBackend, SearchConfig};
use crate::error::{Result, StorefrontError};
use crate::models::{ComponentSearchView, ComponentTag, SearchResultAttribute};

mod elasticsearch;
mod solr;

pub use elasticsearch::ElasticsearchSearchServer;
pub use solr::SolrSearchServer;

pub trait SearchServer: Send + Sync {
    fn backend(&self) -> SearchBackend;

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) {}

    fn search(&self, query: &str, limit: usize) -> Result<Vec<ComponentSearchView>>;
}

pub struct SearchServerManager {
    server: Box<dyn SearchServer>,
    max_results: usize,
    started: AtomicBool,
}

impl std::fmt::Debug for SearchServerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServerManager")
            .field("backend", &self.server.backend())
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

impl SearchServerManager {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let server: Box<dyn SearchServer> = match config.backend {
            SearchBackend::Solr => Box::new(SolrSearchServer::new(config)?),
            SearchBackend::Elasticsearch => Box::new(ElasticsearchSearchServer::new(config)?),
        };
        Ok(Self::with_server(server, config.max_results))
    }

    pub fn with_server(server: Box<dyn SearchServer>, max_results: usize) -> Self {
        Self {
            server,
            max_results: max_results.max(1),
            started: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> SearchBackend {
        self.server.backend()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn initialize(&self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }
        self.server.initialize()?;
        self.started.store(true, Ordering::Release);
        info!(
            target: "storefront.search",
            backend = self.backend().as_str(),
            "search server started"
        );
        Ok(())
    }

    pub fn shutdown(&self) {
        if self.started.swap(false, Ordering::AcqRel) {
            self.server.shutdown();
            info!(
                target: "storefront.search",
                backend = self.backend().as_str(),
                "search server stopped"
            );
        }
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<ComponentSearchView>> {
        if !self.is_started() {
            return Err(StorefrontError::SearchUnavailable(format!(
                "{} search server is not initialized",
                self.backend().as_str()
            )));
        }
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.clamp(1, self.max_results);
        let results = self.server.search(query, limit)?;
        debug!(
            target: "storefront.search",
            backend = self.backend().as_str(),
            limit,
            count = results.len(),
            "fetched search candidates"
        );
        Ok(results)
    }
}

/// Maps one engine document onto a candidate; absent or mistyped fields stay empty.
pub(crate) fn view_from_document(doc: &Value) -> ComponentSearchView {
    ComponentSearchView {
        component_id: first_string(doc, &["component_id", "componentId", "id"]).unwrap_or_default(),
        name: first_string(doc, &["name"]),
        organization: first_string(doc, &["organization"]),
        description: first_string(doc, &["description"]),
        tags: doc
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(tag_from_value).collect())
            .unwrap_or_default(),
        attributes: doc
            .get("attributes")
            .and_then(Value::as_array)
            .map(|attributes| attributes.iter().map(attribute_from_value).collect())
            .unwrap_or_default(),
        search_score: 0.0,
    }
}

fn first_string(doc: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match doc.get(*key)? {
        Value::String(value) => Some(value.clone()),
        // Solr may hand back single-valued text fields as one-element arrays.
        Value::Array(values) => values.first().and_then(Value::as_str).map(ToString::to_string),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn tag_from_value(value: &Value) -> Option<ComponentTag> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Object(_) => value.get("text").and_then(Value::as_str)?.to_string(),
        _ => return None,
    };
    Some(ComponentTag { text })
}

fn attribute_from_value(value: &Value) -> SearchResultAttribute {
    SearchResultAttribute {
        label: first_string(value, &["label"]).unwrap_or_default(),
        type_label: first_string(value, &["type_label", "typeLabel"]).unwrap_or_default(),
    }
}
