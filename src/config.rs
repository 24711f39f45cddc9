//! Cache settings

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::hash::HashProvider;
use crate::hash::Sha256HashProvider;
use crate::model::CachedEntry;
use crate::policy::CachePolicy;

/// Caller hook evaluated once per would-be insert; returning `true`
/// vetoes caching that particular value.
pub type SkipPredicate = Arc<dyn Fn(&str, &CachedEntry) -> bool + Send + Sync>;

/// Configuration for the interception processor.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use statement_cache::CacheSettings;
///
/// let settings = CacheSettings::default()
///     .with_known_entities(["Posts", "Users", "Products"])
///     .with_key_prefix("EF_")
///     .cache_all_queries(Duration::from_secs(300));
/// ```
#[derive(Clone)]
pub struct CacheSettings {
    /// Namespace prefix prepended to every cache key hash.
    ///
    /// Default: empty.
    pub key_prefix: String,

    /// Namespace prefix prepended to every dependency identifier.
    ///
    /// Default: empty.
    pub dependency_prefix: String,

    /// The whitelist of real table/entity names, typically derived from
    /// schema metadata. Statement tokens not in this set are never
    /// treated as dependencies.
    pub known_entities: BTreeSet<String>,

    /// Policy applied to directive-less read statements. `None` means
    /// only statements carrying a directive are cached.
    pub default_policy: Option<CachePolicy>,

    /// Match candidate identifiers against known entities ignoring ASCII
    /// case.
    ///
    /// Default: `false` (exact match).
    pub case_insensitive_entities: bool,

    /// Optional veto hook consulted before each insert.
    pub skip_predicate: Option<SkipPredicate>,

    /// Hash provider used for key construction.
    ///
    /// Default: SHA-256.
    pub hash_provider: Arc<dyn HashProvider>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            dependency_prefix: String::new(),
            known_entities: BTreeSet::new(),
            default_policy: None,
            case_insensitive_entities: false,
            skip_predicate: None,
            hash_provider: Arc::new(Sha256HashProvider),
        }
    }
}

impl CacheSettings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache key namespace prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets the dependency identifier namespace prefix.
    pub fn with_dependency_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.dependency_prefix = prefix.into();
        self
    }

    /// Sets the known entity names.
    pub fn with_known_entities(
        mut self,
        entities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.known_entities = entities.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the default policy for directive-less read statements.
    pub fn with_default_policy(mut self, policy: CachePolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Caches every read statement automatically with an absolute TTL.
    ///
    /// Shorthand for a default policy with absolute expiration.
    pub fn cache_all_queries(self, ttl: Duration) -> Self {
        self.with_default_policy(CachePolicy::absolute(ttl))
    }

    /// Enables case-insensitive known-entity matching.
    pub fn with_case_insensitive_entities(mut self, enabled: bool) -> Self {
        self.case_insensitive_entities = enabled;
        self
    }

    /// Sets the veto hook consulted before each insert.
    pub fn with_skip_predicate(
        mut self,
        predicate: impl Fn(&str, &CachedEntry) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.skip_predicate = Some(Arc::new(predicate));
        self
    }

    /// Replaces the hash provider used for key construction.
    pub fn with_hash_provider(mut self, provider: impl HashProvider + 'static) -> Self {
        self.hash_provider = Arc::new(provider);
        self
    }
}
