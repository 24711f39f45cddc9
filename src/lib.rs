//! Read-through SQL result cache with semantic dependency invalidation
//!
//! Sits between a data-access layer and its statement executor. Before a
//! statement runs, the [`InterceptorProcessor`] checks whether its result
//! is already cached and can short-circuit execution; after a statement
//! runs, it either caches the result or, for data-mutating statements,
//! invalidates every cached result depending on the written tables.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use statement_cache::{CacheSettings, Intercept, InterceptorProcessor};
//! use statement_cache::model::{ResultKind, Statement};
//! use statement_cache::store::CacheStore;
//!
//! let settings = CacheSettings::default()
//!     .with_known_entities(["Posts", "Users"])
//!     .cache_all_queries(Duration::from_secs(300));
//! let processor = InterceptorProcessor::new(CacheStore::in_memory(), settings);
//!
//! let statement = Statement::new("SELECT * FROM [Users]");
//! match processor.before_execute(&statement, "server=db1", ResultKind::Rows).await? {
//!     Intercept::Hit(result) => return Ok(result),
//!     Intercept::Proceed => {}
//! }
//! let raw = execute(&statement)?;
//! let result = processor.after_execute(&statement, "server=db1", raw).await?;
//! ```

pub mod config;
pub mod dependencies;
pub mod error;
pub mod hash;
pub mod key;
pub mod model;
pub mod policy;
pub mod store;

mod interceptor;

pub use config::CacheSettings;
pub use config::SkipPredicate;
pub use interceptor::*;
