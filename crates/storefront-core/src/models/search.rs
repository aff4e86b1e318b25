use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentTag {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultAttribute {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub type_label: String,
}

/// A search result record as returned by the search server, before and after scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSearchView {
    #[serde(default, alias = "id")]
    pub component_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<ComponentTag>,
    #[serde(default)]
    pub attributes: Vec<SearchResultAttribute>,
    #[serde(default)]
    pub search_score: f32,
}

impl ComponentSearchView {
    pub fn named(component_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
