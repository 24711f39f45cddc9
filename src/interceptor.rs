//! Statement interception orchestration
//!
//! The processor sits on both sides of statement execution. Before
//! execution it decides whether a cached result can be served instead of
//! running the statement; after execution it either invalidates
//! dependencies (for writes) or captures the result into the cache (for
//! cacheable reads). Caching is an optimization layer: every parsing
//! failure degrades to "proceed with normal execution".

use tracing::debug;

use crate::config::CacheSettings;
use crate::dependencies::DependencyExtractor;
use crate::dependencies::is_mutating_statement;
use crate::error::CacheError;
use crate::key::CacheKeyBuilder;
use crate::model::CachedEntry;
use crate::model::ResultKind;
use crate::model::RowSet;
use crate::model::Statement;
use crate::model::StatementResult;
use crate::model::Value;
use crate::policy::PolicyParser;
use crate::store::CacheStore;

/// The read-path decision: run the statement or serve from cache.
#[derive(Debug)]
pub enum Intercept {
    /// Nothing cached; proceed with normal execution.
    Proceed,
    /// A cached result short-circuits execution.
    Hit(StatementResult),
}

impl Intercept {
    /// Returns `true` if the cache short-circuited execution.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Orchestrates the read and write interception paths.
///
/// # Example
///
/// ```ignore
/// use statement_cache::{CacheSettings, Intercept, InterceptorProcessor};
/// use statement_cache::store::CacheStore;
///
/// let processor = InterceptorProcessor::new(CacheStore::in_memory(), settings);
///
/// match processor.before_execute(&statement, "server=db1", ResultKind::Rows).await? {
///     Intercept::Hit(result) => return Ok(result),
///     Intercept::Proceed => {}
/// }
/// let result = executor.execute(&statement)?;
/// let result = processor.after_execute(&statement, "server=db1", result).await?;
/// ```
pub struct InterceptorProcessor {
    store: CacheStore,
    settings: CacheSettings,
    policy_parser: PolicyParser,
    extractor: DependencyExtractor,
    key_builder: CacheKeyBuilder,
}

impl InterceptorProcessor {
    /// Creates a processor over a store with the given settings.
    pub fn new(store: CacheStore, settings: CacheSettings) -> Self {
        let policy_parser = PolicyParser::new(settings.default_policy.clone());
        let extractor = DependencyExtractor::new(
            settings.known_entities.iter().cloned(),
            settings.dependency_prefix.clone(),
            settings.case_insensitive_entities,
        );
        let key_builder =
            CacheKeyBuilder::new(settings.hash_provider.clone(), settings.key_prefix.clone());
        Self {
            store,
            settings,
            policy_parser,
            extractor,
            key_builder,
        }
    }

    /// The before-execution hook: read interception.
    ///
    /// Returns [`Intercept::Hit`] with a replayable result when the
    /// statement's result is already cached, including a synthetic empty
    /// result of the `expected` shape when the cached entry records an
    /// empty outcome. Returns [`Intercept::Proceed`] on a miss or for
    /// non-cacheable statements.
    pub async fn before_execute(
        &self,
        statement: &Statement,
        connection: &str,
        expected: ResultKind,
    ) -> Result<Intercept, CacheError> {
        validate(statement)?;

        let Some(policy) = self.policy_parser.parse(&statement.text) else {
            debug!("skipping a non-cacheable statement");
            return Ok(Intercept::Proceed);
        };

        let dependencies = self.extractor.extract(&statement.text);
        let key = self
            .key_builder
            .build(statement, connection, &policy, dependencies)?;

        let Some(entry) = self.store.get(&key).await? else {
            return Ok(Intercept::Proceed);
        };

        if entry.is_empty() {
            debug!(key = %key.hash, "serving cached empty result");
            return Ok(Intercept::Hit(empty_result(expected)));
        }

        debug!(key = %key.hash, "serving cached result");
        Ok(Intercept::Hit(replay(entry)))
    }

    /// The after-execution hook: invalidation and cache population.
    ///
    /// A mutating statement invalidates every cached entry depending on
    /// the tables it writes; its own result is never cached. A cacheable
    /// read has its result classified and stored; a live cursor is
    /// drained into an immutable snapshot, and the returned result is
    /// backed by that snapshot so the caller still sees the data.
    pub async fn after_execute(
        &self,
        statement: &Statement,
        connection: &str,
        result: StatementResult,
    ) -> Result<StatementResult, CacheError> {
        if let Err(e) = validate(statement) {
            // the caller handed over the cursor; release it before bailing
            if let StatementResult::Cursor(mut source) = result {
                source.close();
            }
            return Err(e);
        }

        let dependencies = self.extractor.extract(&statement.text);
        if is_mutating_statement(&statement.text) {
            if !dependencies.is_empty() {
                let removed = self.store.invalidate(&dependencies).await?;
                debug!(?dependencies, removed, "invalidated dependencies of a write");
            }
            return Ok(result);
        }

        let Some(policy) = self.policy_parser.parse(&statement.text) else {
            debug!("skipping a non-cacheable statement");
            return Ok(result);
        };

        let key = self
            .key_builder
            .build(statement, connection, &policy, dependencies)?;

        let (entry, result) = classify(result)?;

        if !policy.kinds.allows(&entry) {
            debug!(key = %key.hash, "result kind excluded by policy");
            return Ok(result);
        }

        if let Some(predicate) = &self.settings.skip_predicate {
            if predicate(&statement.text, &entry) {
                debug!(key = %key.hash, "caching vetoed by the skip predicate");
                return Ok(result);
            }
        }

        self.store.insert(&key, entry, &policy).await?;
        Ok(result)
    }
}

fn validate(statement: &Statement) -> Result<(), CacheError> {
    if statement.text.trim().is_empty() {
        return Err(CacheError::InvalidStatement("statement text is empty"));
    }
    Ok(())
}

/// Classifies a raw result into a cacheable entry, materializing live
/// cursors. Returns the entry together with the (possibly
/// snapshot-backed) result handed back to the caller.
fn classify(result: StatementResult) -> Result<(CachedEntry, StatementResult), CacheError> {
    Ok(match result {
        StatementResult::Cursor(source) => {
            let snapshot = RowSet::from_source(source)?;
            (
                CachedEntry::Rows(snapshot.clone()),
                StatementResult::Rows(snapshot),
            )
        }
        StatementResult::Rows(rows) => (
            CachedEntry::Rows(rows.clone()),
            StatementResult::Rows(rows),
        ),
        StatementResult::Scalar(value) => (
            CachedEntry::Scalar(value.clone()),
            StatementResult::Scalar(value),
        ),
        StatementResult::NonQuery(count) => {
            (CachedEntry::NonQuery(count), StatementResult::NonQuery(count))
        }
        StatementResult::None => (CachedEntry::Null, StatementResult::None),
    })
}

/// Replays a cached entry as a statement result.
fn replay(entry: CachedEntry) -> StatementResult {
    match entry {
        CachedEntry::Scalar(value) => StatementResult::Scalar(value),
        CachedEntry::NonQuery(count) => StatementResult::NonQuery(count),
        CachedEntry::Rows(rows) => StatementResult::Rows(rows),
        CachedEntry::Null => StatementResult::None,
    }
}

/// Builds an empty short-circuit result of the shape the caller expects.
fn empty_result(expected: ResultKind) -> StatementResult {
    match expected {
        ResultKind::Rows => StatementResult::Rows(RowSet::empty()),
        ResultKind::Scalar => StatementResult::Scalar(Value::Null),
        ResultKind::NonQuery => StatementResult::NonQuery(0),
    }
}
