//! Cache policies
//!
//! A [`CachePolicy`] controls how long a cached result lives, how it
//! expires, and which result kinds it covers. Policies come from an inline
//! statement directive or from a globally configured default; see
//! [`PolicyParser`].

mod parser;

pub use parser::*;

use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

use crate::model::CachedEntry;
use crate::model::ResultKind;

/// Default cache duration when a directive omits one: 20 minutes.
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(20 * 60);

/// How a cached entry expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpirationMode {
    /// The entry expires at a fixed deadline after insertion.
    #[default]
    Absolute,
    /// The deadline is pushed out on every hit.
    Sliding,
    /// The entry never expires and is exempt from dependency-based
    /// invalidation.
    NeverRemove,
    /// The entry never expires by time but is still invalidated when a
    /// dependency mutates.
    NeverExpire,
}

/// Which result kinds a policy allows to be cached.
///
/// `Null` entries are always cacheable; the flags gate the three concrete
/// result kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheableKinds {
    /// Cache scalar results.
    pub scalar: bool,
    /// Cache affected-row counts.
    pub non_query: bool,
    /// Cache row snapshots.
    pub rows: bool,
}

impl CacheableKinds {
    /// All result kinds cacheable.
    pub fn all() -> Self {
        Self {
            scalar: true,
            non_query: true,
            rows: true,
        }
    }

    /// Returns `true` if the given entry may be cached under these flags.
    pub fn allows(&self, entry: &CachedEntry) -> bool {
        match entry.kind() {
            None => true,
            Some(ResultKind::Scalar) => self.scalar,
            Some(ResultKind::NonQuery) => self.non_query,
            Some(ResultKind::Rows) => self.rows,
        }
    }
}

impl Default for CacheableKinds {
    fn default() -> Self {
        Self::all()
    }
}

/// A parsed, immutable cache policy for one statement execution.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use statement_cache::policy::{CachePolicy, ExpirationMode};
///
/// let policy = CachePolicy::default()
///     .with_mode(ExpirationMode::Sliding)
///     .with_duration(Duration::from_secs(60))
///     .with_salt("tenant-42");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    /// Expiration mode.
    pub mode: ExpirationMode,
    /// Cache duration for the time-based modes.
    pub duration: Duration,
    /// Extra salt mixed into the cache key.
    pub salt: String,
    /// Result kinds this policy covers.
    pub kinds: CacheableKinds,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            mode: ExpirationMode::default(),
            duration: DEFAULT_CACHE_DURATION,
            salt: String::new(),
            kinds: CacheableKinds::all(),
        }
    }
}

impl CachePolicy {
    /// Creates a policy with the given duration and absolute expiration.
    pub fn absolute(duration: Duration) -> Self {
        Self {
            mode: ExpirationMode::Absolute,
            duration,
            ..Self::default()
        }
    }

    /// Sets the expiration mode.
    pub fn with_mode(mut self, mode: ExpirationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the cache duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the cache key salt.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Sets the cacheable result kinds.
    pub fn with_kinds(mut self, kinds: CacheableKinds) -> Self {
        self.kinds = kinds;
        self
    }

    /// Computes the expiration deadline for an entry inserted at `now`.
    pub fn deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.mode {
            ExpirationMode::Absolute | ExpirationMode::Sliding => {
                now + chrono::Duration::from_std(self.duration).unwrap_or(chrono::Duration::zero())
            }
            ExpirationMode::NeverRemove | ExpirationMode::NeverExpire => DateTime::<Utc>::MAX_UTC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_deadline() {
        let policy = CachePolicy::absolute(Duration::from_secs(600));
        let now = Utc::now();
        assert_eq!(policy.deadline_from(now), now + chrono::Duration::seconds(600));
    }

    #[test]
    fn test_never_expire_deadline_is_unbounded() {
        let policy = CachePolicy::default().with_mode(ExpirationMode::NeverExpire);
        assert_eq!(policy.deadline_from(Utc::now()), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_kinds_gate_entries() {
        let kinds = CacheableKinds {
            scalar: false,
            non_query: true,
            rows: true,
        };
        assert!(!kinds.allows(&CachedEntry::Scalar(crate::model::Value::Int(1))));
        assert!(kinds.allows(&CachedEntry::NonQuery(3)));
        assert!(kinds.allows(&CachedEntry::Null));
    }
}
