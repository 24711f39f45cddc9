//! Materialized row snapshots and the live-cursor seam

use serde::Deserialize;
use serde::Serialize;

use crate::error::CacheError;

use super::Value;

/// A column in a [`RowSet`]: name plus the driver-reported type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Driver-reported type name, e.g. `nvarchar` or `int`.
    pub type_name: String,
}

impl Column {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// An immutable, fully materialized snapshot of a tabular result.
///
/// Captured once from a live cursor and then replayed arbitrarily many
/// times without re-reading the source. Holds no reference to the cursor
/// it was drained from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    /// Name of the primary table the rows came from, if known.
    pub table_name: String,
    /// Ordered column descriptors.
    pub columns: Vec<Column>,
    /// Ordered rows; each row is an ordered list of values.
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    /// Creates an empty snapshot with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of rows in the snapshot.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the snapshot holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drains a live cursor to completion and captures it as a snapshot.
    ///
    /// The source is closed on every exit path, including a failure while
    /// draining; a partially filled snapshot is never returned.
    pub fn from_source(mut source: Box<dyn RowSource>) -> Result<Self, CacheError> {
        let table_name = source.table_name().to_string();
        let columns = source.columns().to_vec();

        let mut rows = Vec::new();
        loop {
            match source.next_row() {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break,
                Err(e) => {
                    source.close();
                    return Err(e);
                }
            }
        }
        source.close();

        Ok(Self {
            table_name,
            columns,
            rows,
        })
    }
}

/// A live, forward-only result cursor produced by the statement executor.
///
/// This is the seam between the cache and the physical data-access driver.
/// The cache only ever drains a source once, via [`RowSet::from_source`].
pub trait RowSource: Send {
    /// Name of the primary table the cursor reads from, if known.
    fn table_name(&self) -> &str;

    /// Ordered column descriptors for the result.
    fn columns(&self) -> &[Column];

    /// Advances the cursor and returns the next row, or `None` when the
    /// cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<Value>>, CacheError>;

    /// Releases the underlying cursor resources.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource {
        rows: Vec<Vec<Value>>,
        fail_after: Option<usize>,
        served: usize,
        closed: bool,
        columns: Vec<Column>,
    }

    impl FakeSource {
        fn new(rows: Vec<Vec<Value>>) -> Self {
            Self {
                rows,
                fail_after: None,
                served: 0,
                closed: false,
                columns: vec![Column::new("id", "int")],
            }
        }
    }

    impl RowSource for FakeSource {
        fn table_name(&self) -> &str {
            "Users"
        }

        fn columns(&self) -> &[Column] {
            &self.columns
        }

        fn next_row(&mut self) -> Result<Option<Vec<Value>>, CacheError> {
            if self.fail_after == Some(self.served) {
                return Err(CacheError::row_source("connection lost"));
            }
            let row = self.rows.get(self.served).cloned();
            self.served += 1;
            Ok(row)
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn test_from_source_drains_everything() {
        let rows = vec![vec![Value::Int(1)], vec![Value::Int(2)]];
        let snapshot = RowSet::from_source(Box::new(FakeSource::new(rows))).unwrap();
        assert_eq!(snapshot.table_name, "Users");
        assert_eq!(snapshot.row_count(), 2);
        assert_eq!(snapshot.rows[1], vec![Value::Int(2)]);
    }

    #[test]
    fn test_from_source_error_does_not_yield_partial_snapshot() {
        let mut source = FakeSource::new(vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        source.fail_after = Some(1);
        let result = RowSet::from_source(Box::new(source));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = RowSet::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.row_count(), 0);
    }
}
