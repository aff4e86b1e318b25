use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reserved code of the root value of an attribute type.
pub const ROOT_CODE: &str = "0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveStatus {
    #[default]
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
}

impl ActiveStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "A",
            Self::Inactive => "I",
        }
    }
}

impl std::fmt::Display for ActiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "A" => Ok(Self::Active),
            "I" => Ok(Self::Inactive),
            other => Err(format!("unknown active status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    pub type_key: String,
    pub description: String,
    #[serde(default)]
    pub architecture: bool,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

const fn default_visible() -> bool {
    true
}

impl AttributeType {
    pub fn new(type_key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            description: description.into(),
            architecture: false,
            allow_multiple: false,
            important: false,
            required: false,
            visible: true,
        }
    }

    #[must_use]
    pub fn architecture(mut self) -> Self {
        self.architecture = true;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// One value of an attribute type, addressed by `(type_key, code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    /// May be left empty inside a sync item; the item's type fills it in.
    #[serde(default)]
    pub type_key: String,
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

impl CodeEntry {
    pub fn new(
        type_key: impl Into<String>,
        code: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            type_key: type_key.into(),
            code: code.into(),
            label: label.into(),
            description: String::new(),
            detail_url: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.code == ROOT_CODE
    }

    pub fn key(&self) -> String {
        format!("{}|{}", self.type_key, self.code)
    }
}

/// One attribute type and the complete set of codes it should have after a sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSyncItem {
    pub attribute_type: AttributeType,
    #[serde(default)]
    pub codes: Vec<CodeEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncBatch {
    pub types: Vec<AttributeSyncItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    pub types_saved: usize,
    pub codes_saved: usize,
    pub types_deactivated: Vec<String>,
    pub codes_deactivated: Vec<String>,
    pub rejected: Vec<String>,
}
