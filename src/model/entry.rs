//! Cached result entries

use serde::Deserialize;
use serde::Serialize;

use super::ResultKind;
use super::RowSet;
use super::Value;

/// A result stored in the cache.
///
/// `Null` is a first-class case distinct from "absent from cache": it
/// records that a statement legitimately produced nothing, so a later
/// lookup reports a cached empty result rather than a miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CachedEntry {
    /// The statement legitimately produced no result.
    Null,
    /// A scalar result.
    Scalar(Value),
    /// An affected-row count.
    NonQuery(u64),
    /// A materialized row snapshot.
    Rows(RowSet),
}

impl CachedEntry {
    /// Returns `true` if this entry records an absent result.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if replaying this entry yields nothing: either a
    /// `Null` entry or a row snapshot with no rows.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Rows(rows) => rows.is_empty(),
            Self::Scalar(value) => value.is_null(),
            Self::NonQuery(_) => false,
        }
    }

    /// Returns the result kind of this entry, or `None` for `Null`.
    pub fn kind(&self) -> Option<ResultKind> {
        match self {
            Self::Null => None,
            Self::Scalar(_) => Some(ResultKind::Scalar),
            Self::NonQuery(_) => Some(ResultKind::NonQuery),
            Self::Rows(_) => Some(ResultKind::Rows),
        }
    }
}
