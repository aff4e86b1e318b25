//! Read-through cache of the active codes of each attribute type.
//!
//! Reads are served from memory when possible and loaded from the backing
//! [`CodeSource`] otherwise. Every write path must call
//! [`TypeCache::invalidate`] after it succeeds. A generation counter bumped by
//! each invalidation keeps a load that raced a write from publishing its
//! result, so the cache never serves data older than the last write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::InvalidationPolicy;
use crate::error::{Result, StorefrontError};
use crate::models::CodeEntry;

/// Backing store the cache reads through to.
pub trait CodeSource: Send + Sync {
    fn active_type_keys(&self) -> Result<Vec<String>>;
    fn load_codes(&self, type_key: &str) -> Result<Vec<CodeEntry>>;
}

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub key: String,
    pub value: T,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationScope {
    Type(String),
    All,
}

impl InvalidationScope {
    pub fn for_type(type_key: impl Into<String>) -> Self {
        Self::Type(type_key.into())
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<RefreshFailure>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RefreshFailure {
    pub type_key: String,
    pub error: String,
}

type CodeList = Arc<[CodeEntry]>;

pub struct TypeCache {
    source: Arc<dyn CodeSource>,
    policy: InvalidationPolicy,
    entries: RwLock<HashMap<String, CacheEntry<CodeList>>>,
    generation: AtomicU64,
}

impl std::fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl TypeCache {
    pub fn new(source: Arc<dyn CodeSource>, policy: InvalidationPolicy) -> Self {
        Self {
            source,
            policy,
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub const fn policy(&self) -> InvalidationPolicy {
        self.policy
    }

    pub fn get(&self, type_key: &str) -> Result<CodeList> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|_| StorefrontError::mutex_poisoned("type cache"))?;
            if let Some(entry) = entries.get(type_key) {
                return Ok(Arc::clone(&entry.value));
            }
        }

        let generation = self.generation.load(Ordering::Acquire);
        let codes: CodeList = self.source.load_codes(type_key)?.into();
        debug!(
            target: "storefront.cache",
            type_key,
            count = codes.len(),
            "loaded codes from store"
        );

        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorefrontError::mutex_poisoned("type cache"))?;
        if self.generation.load(Ordering::Acquire) == generation {
            entries.insert(
                type_key.to_string(),
                CacheEntry {
                    key: type_key.to_string(),
                    value: Arc::clone(&codes),
                    loaded_at: Utc::now(),
                },
            );
        } else {
            debug!(
                target: "storefront.cache",
                type_key,
                "skipped publishing load that raced an invalidation"
            );
        }
        Ok(codes)
    }

    pub fn invalidate(&self, scope: &InvalidationScope) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorefrontError::mutex_poisoned("type cache"))?;
        self.generation.fetch_add(1, Ordering::AcqRel);
        match (scope, self.policy) {
            (InvalidationScope::Type(type_key), InvalidationPolicy::PerType) => {
                entries.remove(type_key);
                debug!(target: "storefront.cache", type_key = %type_key, "invalidated type");
            }
            _ => {
                entries.clear();
                debug!(target: "storefront.cache", "invalidated all types");
            }
        }
        Ok(())
    }

    /// Reloads every active type and replaces the cache contents.
    ///
    /// A type whose load fails is logged and left out (it will be loaded on
    /// demand later); the other types still refresh. Failing to list the
    /// active types aborts the refresh and leaves the cache untouched.
    pub fn refresh_all(&self) -> Result<RefreshReport> {
        let generation = self.generation.load(Ordering::Acquire);
        let type_keys = self.source.active_type_keys()?;

        let mut report = RefreshReport::default();
        let mut fresh = HashMap::with_capacity(type_keys.len());
        for type_key in type_keys {
            match self.source.load_codes(&type_key) {
                Ok(codes) => {
                    fresh.insert(
                        type_key.clone(),
                        CacheEntry {
                            key: type_key.clone(),
                            value: CodeList::from(codes),
                            loaded_at: Utc::now(),
                        },
                    );
                    report.refreshed.push(type_key);
                }
                Err(err) => {
                    warn!(
                        target: "storefront.cache",
                        type_key = %type_key,
                        error = %err,
                        "failed to refresh attribute type; continuing"
                    );
                    report.failed.push(RefreshFailure {
                        type_key,
                        error: err.to_string(),
                    });
                }
            }
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorefrontError::mutex_poisoned("type cache"))?;
        if self.generation.load(Ordering::Acquire) == generation {
            *entries = fresh;
        } else {
            // A write landed mid-refresh; anything loaded may predate it.
            entries.clear();
        }
        info!(
            target: "storefront.cache",
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            "refreshed attribute cache"
        );
        Ok(report)
    }

    pub fn clear(&self) -> Result<()> {
        self.invalidate(&InvalidationScope::All)
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(type_key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of cached keys with their sizes, sorted by key.
    pub fn entries(&self) -> Result<Vec<CacheEntry<usize>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorefrontError::mutex_poisoned("type cache"))?;
        let mut out = entries
            .values()
            .map(|entry| CacheEntry {
                key: entry.key.clone(),
                value: entry.value.len(),
                loaded_at: entry.loaded_at,
            })
            .collect::<Vec<_>>();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }
}

#[cfg(test)]
mod tests;
