//! Cache key construction

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::debug;

use crate::error::CacheError;
use crate::hash::HashProvider;
use crate::model::Statement;
use crate::policy::CachePolicy;
use crate::policy::strip_directive;

/// The canonical identity of one cached statement result.
///
/// `hash` uniquely names the cached result; `dependencies` is the set of
/// table identifiers the statement reads (for a read) or writes (for a
/// write). Built once per statement execution and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    /// Uppercase-hex hash naming the cached result, with any configured
    /// key prefix applied.
    pub hash: String,
    /// Dependency identifiers this statement touches.
    pub dependencies: BTreeSet<String>,
}

impl CacheKey {
    /// Creates a new cache key.
    pub fn new(hash: impl Into<String>, dependencies: BTreeSet<String>) -> Self {
        Self {
            hash: hash.into(),
            dependencies,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyHash: {}, Dependencies: {}",
            self.hash,
            self.dependencies
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Builds deterministic cache keys from statement text, bound parameters,
/// a connection descriptor, and the policy salt.
///
/// Two logically identical executions always produce the same hash; any
/// difference in any input changes it. Collision avoidance is delegated
/// to the [`HashProvider`].
#[derive(Clone)]
pub struct CacheKeyBuilder {
    hash_provider: Arc<dyn HashProvider>,
    key_prefix: String,
}

impl CacheKeyBuilder {
    /// Creates a new key builder.
    pub fn new(hash_provider: Arc<dyn HashProvider>, key_prefix: impl Into<String>) -> Self {
        Self {
            hash_provider,
            key_prefix: key_prefix.into(),
        }
    }

    /// Computes the cache key for a statement execution.
    ///
    /// The policy directive is stripped from the statement text before
    /// hashing, so semantically identical statements hash identically
    /// regardless of directive presence.
    pub fn build(
        &self,
        statement: &Statement,
        connection: &str,
        policy: &CachePolicy,
        dependencies: BTreeSet<String>,
    ) -> Result<CacheKey, CacheError> {
        if statement.text.trim().is_empty() {
            return Err(CacheError::InvalidStatement("statement text is empty"));
        }

        let buffer = key_buffer(statement, connection, &policy.salt);
        let digest = self.hash_provider.digest(buffer.as_bytes());
        let hash = format!("{}{}", self.key_prefix, to_upper_hex(&digest));

        debug!(key = %hash, "computed cache key");
        Ok(CacheKey::new(hash, dependencies))
    }
}

/// Assembles the canonical byte buffer fed to the hash provider: the
/// directive-stripped statement text, a connection descriptor line, one
/// fragment per parameter in caller-supplied order, and a salt line.
fn key_buffer(statement: &Statement, connection: &str, salt: &str) -> String {
    let mut buffer = String::new();
    buffer.push_str(strip_directive(&statement.text).trim());
    buffer.push('\n');

    let _ = writeln!(buffer, "ConnectionString={connection}");

    for parameter in &statement.parameters {
        let _ = write!(
            buffer,
            "{}={},Size={},Precision={},Scale={},Direction={},",
            parameter.name,
            parameter.value.key_fragment(),
            parameter.size,
            parameter.precision,
            parameter.scale,
            parameter.direction,
        );
    }

    buffer.push('\n');
    let _ = write!(buffer, "SaltKey={salt}");
    buffer.trim().to_string()
}

fn to_upper_hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02X}");
    }
    out
}
