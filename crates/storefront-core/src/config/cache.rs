use crate::error::{Result, StorefrontError};

const ENV_CACHE_INVALIDATION: &str = "STOREFRONT_CACHE_INVALIDATION";

/// How far a single write reaches into the type cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidationPolicy {
    /// Drop only the written type.
    #[default]
    PerType,
    /// Drop every cached type on any write.
    All,
}

impl InvalidationPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerType => "type",
            Self::All => "all",
        }
    }

    pub(crate) fn parse(raw: Option<&str>) -> Result<Self> {
        let normalized = raw.map(|value| value.trim().to_ascii_lowercase());
        match normalized.as_deref() {
            None | Some("type") => Ok(Self::PerType),
            Some("all") => Ok(Self::All),
            Some(other) => Err(StorefrontError::Validation(format!(
                "invalid {ENV_CACHE_INVALIDATION}: {other} (expected type|all)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    pub invalidation: InvalidationPolicy,
}

impl CacheConfig {
    pub(super) fn from_env() -> Result<Self> {
        Ok(Self {
            invalidation: InvalidationPolicy::parse(
                std::env::var(ENV_CACHE_INVALIDATION).ok().as_deref(),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::InvalidationPolicy;

    #[test]
    fn invalidation_policy_defaults_to_per_type() {
        assert_eq!(
            InvalidationPolicy::parse(None).expect("default policy"),
            InvalidationPolicy::PerType
        );
        assert_eq!(
            InvalidationPolicy::parse(Some("ALL")).expect("coarse policy"),
            InvalidationPolicy::All
        );
    }

    #[test]
    fn invalidation_policy_rejects_unknown_values() {
        assert!(InvalidationPolicy::parse(Some("never")).is_err());
    }
}
