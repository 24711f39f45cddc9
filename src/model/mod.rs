//! Data model for statements, values, and cached results

mod entry;
mod row_set;
mod statement;
mod value;

pub use entry::*;
pub use row_set::*;
pub use statement::*;
pub use value::*;
