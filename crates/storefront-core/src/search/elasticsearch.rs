use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::config::{SearchBackend, SearchConfig};
use crate::error::{Result, StorefrontError};
use crate::models::ComponentSearchView;

use super::{SearchServer, view_from_document};

#[derive(Clone)]
pub struct ElasticsearchSearchServer {
    base_url: String,
    index: String,
    http: Client,
}

impl std::fmt::Debug for ElasticsearchSearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchSearchServer")
            .field("base_url", &self.base_url)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchSearchServer {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let index = config.elasticsearch_index.trim();
        if index.is_empty() || index.contains('/') {
            return Err(StorefrontError::Validation(format!(
                "invalid elasticsearch index name: {:?}",
                config.elasticsearch_index
            )));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.elasticsearch_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
            http,
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/{}/_search", self.base_url, self.index)
    }
}

impl SearchServer for ElasticsearchSearchServer {
    fn backend(&self) -> SearchBackend {
        SearchBackend::Elasticsearch
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<ComponentSearchView>> {
        let resp = self
            .http
            .post(self.search_url())
            .json(&search_body(query, limit))
            .send()?;
        if !resp.status().is_success() {
            return Err(StorefrontError::SearchUnavailable(format!(
                "elasticsearch search failed with status {}",
                resp.status()
            )));
        }
        let body = resp.json::<Value>()?;
        Ok(documents_from_response(&body))
    }
}

fn search_body(query: &str, limit: usize) -> Value {
    json!({
        "size": limit,
        "query": {
            "query_string": {
                "query": query,
                "default_operator": "AND"
            }
        }
    })
}

fn documents_from_response(body: &Value) -> Vec<ComponentSearchView> {
    body.pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    let source = hit.get("_source")?;
                    let mut view = view_from_document(source);
                    if view.component_id.is_empty()
                        && let Some(id) = hit.get("_id").and_then(Value::as_str)
                    {
                        view.component_id = id.to_string();
                    }
                    Some(view)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ElasticsearchSearchServer, documents_from_response, search_body};
    use crate::config::SearchConfig;

    #[test]
    fn hits_sources_become_candidates_with_hit_id_fallback() {
        let body = json!({
            "hits": {
                "total": {"value": 2},
                "hits": [
                    {"_id": "es-1", "_source": {"name": "Alpha"}},
                    {"_id": "es-2", "_source": {"componentId": "c-2", "organization": "Beta Org"}},
                    {"_id": "es-3"}
                ]
            }
        });
        let views = documents_from_response(&body);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].component_id, "es-1");
        assert_eq!(views[1].component_id, "c-2");
        assert_eq!(views[1].organization.as_deref(), Some("Beta Org"));
    }

    #[test]
    fn search_body_carries_size_and_query_string() {
        let body = search_body("alpha*", 25);
        assert_eq!(body["size"], 25);
        assert_eq!(body["query"]["query_string"]["query"], "alpha*");
    }

    #[test]
    fn index_name_is_validated() {
        let config = SearchConfig {
            elasticsearch_index: "bad/index".to_string(),
            ..SearchConfig::default()
        };
        assert!(ElasticsearchSearchServer::new(&config).is_err());

        let config = SearchConfig {
            elasticsearch_url: "http://es:9200/".to_string(),
            ..SearchConfig::default()
        };
        let server = ElasticsearchSearchServer::new(&config).expect("client");
        assert_eq!(server.search_url(), "http://es:9200/openstorefront/_search");
    }
}
