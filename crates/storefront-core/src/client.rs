use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::cache::TypeCache;
use crate::config::AppConfig;
use crate::error::Result;
use crate::scoring::RelevanceScorer;
use crate::search::SearchServerManager;
use crate::state::SqliteStateStore;

mod attribute_service;
mod search_service;
mod sync_service;

const STATE_DB_FILE: &str = "storefront_state.sqlite3";

/// Key in `system_kv` holding the RFC 3339 time of the last attribute sync.
pub const LAST_SYNC_KEY: &str = "attribute.last_sync";

#[derive(Clone)]
pub struct Storefront {
    pub state: SqliteStateStore,
    cache: Arc<TypeCache>,
    scorer: RelevanceScorer,
    search: Arc<SearchServerManager>,
    config: AppConfig,
    root: PathBuf,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    pub fn new(root_dir: impl Into<PathBuf>, config: AppConfig) -> Result<Self> {
        let search = SearchServerManager::from_config(&config.search)?;
        Self::with_search_manager(root_dir, config, search)
    }

    /// Builds the service around an already constructed search manager.
    pub fn with_search_manager(
        root_dir: impl Into<PathBuf>,
        config: AppConfig,
        search: SearchServerManager,
    ) -> Result<Self> {
        let root = root_dir.into();
        fs::create_dir_all(&root)?;
        let state = SqliteStateStore::open(root.join(STATE_DB_FILE))?;
        let cache = TypeCache::new(Arc::new(state.clone()), config.cache.invalidation);

        Ok(Self {
            state,
            cache: Arc::new(cache),
            scorer: RelevanceScorer::default(),
            search: Arc::new(search),
            config,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Starts the search server and warms the type cache.
    pub fn initialize(&self) -> Result<()> {
        self.search.initialize()?;
        self.cache.refresh_all()?;
        Ok(())
    }

    pub fn shutdown(&self) {
        self.search.shutdown();
        if let Err(err) = self.cache.clear() {
            warn!(target: "storefront.cache", error = %err, "failed to clear type cache on shutdown");
        }
    }
}
