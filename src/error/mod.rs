//! Error types

mod backend;
mod cache;

pub use backend::*;
pub use cache::*;
