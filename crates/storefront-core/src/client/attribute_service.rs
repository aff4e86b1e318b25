use std::sync::Arc;

use crate::architecture::{NodeOrdering, build_tree};
use crate::cache::{CacheEntry, InvalidationScope, RefreshReport};
use crate::error::{Result, StorefrontError};
use crate::models::{ActiveStatus, ArchitectureNode, AttributeType, CodeEntry};
use crate::state::SYSTEM_USER;

use super::Storefront;

impl Storefront {
    pub fn save_attribute_type(&self, attribute_type: &AttributeType) -> Result<()> {
        validate_attribute_type(attribute_type).map_err(StorefrontError::InvalidInput)?;
        self.state
            .upsert_attribute_type(attribute_type, SYSTEM_USER)?;
        self.cache
            .invalidate(&InvalidationScope::for_type(&attribute_type.type_key))
    }

    pub fn save_attribute_code(&self, entry: &CodeEntry) -> Result<()> {
        validate_code_entry(entry).map_err(StorefrontError::InvalidInput)?;
        if self.state.find_attribute_type(&entry.type_key)?.is_none() {
            return Err(StorefrontError::NotFound(format!(
                "attribute type {}",
                entry.type_key
            )));
        }
        self.state.upsert_attribute_code(entry, SYSTEM_USER)?;
        self.cache
            .invalidate(&InvalidationScope::for_type(&entry.type_key))
    }

    /// Soft-removes the type; its codes stay stored but the type drops out of lookups.
    pub fn remove_attribute_type(&self, type_key: &str) -> Result<()> {
        if !self
            .state
            .set_type_status(type_key, ActiveStatus::Inactive, SYSTEM_USER)?
        {
            return Err(StorefrontError::NotFound(format!("attribute type {type_key}")));
        }
        self.cache.invalidate(&InvalidationScope::for_type(type_key))
    }

    pub fn remove_attribute_code(&self, type_key: &str, code: &str) -> Result<()> {
        if !self
            .state
            .set_code_status(type_key, code, ActiveStatus::Inactive, SYSTEM_USER)?
        {
            return Err(StorefrontError::NotFound(format!(
                "attribute code {type_key}|{code}"
            )));
        }
        self.cache.invalidate(&InvalidationScope::for_type(type_key))
    }

    pub fn find_codes_for_type(&self, type_key: &str) -> Result<Arc<[CodeEntry]>> {
        self.cache.get(type_key)
    }

    pub fn find_code_for_type(&self, type_key: &str, code: &str) -> Result<Option<CodeEntry>> {
        Ok(self
            .cache
            .get(type_key)?
            .iter()
            .find(|entry| entry.code == code)
            .cloned())
    }

    /// Active type by key; inactive types are reported as absent.
    pub fn find_type(&self, type_key: &str) -> Result<Option<AttributeType>> {
        Ok(self
            .state
            .find_attribute_type(type_key)?
            .filter(|record| record.status == ActiveStatus::Active)
            .map(|record| record.attribute_type))
    }

    pub fn active_attribute_types(&self) -> Result<Vec<AttributeType>> {
        self.state.list_active_attribute_types()
    }

    pub fn required_attribute_types(&self) -> Result<Vec<AttributeType>> {
        self.state.find_required_types()
    }

    pub fn generate_architecture(
        &self,
        type_key: &str,
        ordering: &dyn NodeOrdering,
    ) -> Result<ArchitectureNode> {
        let attribute_type = self
            .find_type(type_key)?
            .ok_or_else(|| StorefrontError::NotFound(format!("attribute type {type_key}")))?;
        if !attribute_type.architecture {
            return Err(StorefrontError::Validation(format!(
                "attribute type {type_key} is not an architecture type"
            )));
        }

        let codes = self.cache.get(type_key)?;
        let mut root = build_tree(type_key, &codes, ordering)?;
        if !attribute_type.description.trim().is_empty() {
            root.name = attribute_type.description;
        }
        Ok(root)
    }

    pub fn refresh_cache(&self) -> Result<RefreshReport> {
        self.cache.refresh_all()
    }

    pub fn cache_entries(&self) -> Result<Vec<CacheEntry<usize>>> {
        self.cache.entries()
    }
}

pub(super) fn validate_attribute_type(attribute_type: &AttributeType) -> std::result::Result<(), String> {
    if attribute_type.type_key.trim().is_empty() {
        return Err("attribute type key must not be empty".to_string());
    }
    if attribute_type.description.trim().is_empty() {
        return Err(format!(
            "attribute type {} has no description",
            attribute_type.type_key
        ));
    }
    Ok(())
}

pub(super) fn validate_code_entry(entry: &CodeEntry) -> std::result::Result<(), String> {
    if entry.type_key.trim().is_empty() {
        return Err(format!("code {} has no attribute type", entry.code));
    }
    if entry.code.trim().is_empty() {
        return Err(format!("code of type {} must not be empty", entry.type_key));
    }
    if entry.label.trim().is_empty() {
        return Err(format!("code {} has no label", entry.key()));
    }
    Ok(())
}
