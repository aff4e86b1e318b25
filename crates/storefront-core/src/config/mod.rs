use crate::error::Result;

mod cache;
mod env;
mod search;

pub use cache::{CacheConfig, InvalidationPolicy};
pub use search::{SearchBackend, SearchConfig};

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            search: SearchConfig::from_env()?,
            cache: CacheConfig::from_env()?,
        })
    }
}
