#![forbid(unsafe_code)]
//! recflow-expr: user expressions evaluated against one record at a time.
//!
//! Two languages share one contract:
//! - `jmespath`: structural queries over the record tree, compiled once
//!   against a process-wide runtime with extra string helpers.
//! - `sql`: SQL expressions evaluated by an embedded SQLite over a synthetic
//!   one-row relation built from the record's fields.
//!
//! `compile` returns a [`CompiledExpression`] exposing `search` (projection)
//! and `test` (predicate).

pub mod compiled;
pub mod error;
pub mod functions;
pub mod jmes;
pub mod language;
pub mod source;
pub mod sql;

pub use compiled::{check, compile, compile_with_cache, CompiledExpression};
pub use error::{ExprError, Result};
pub use language::Language;
pub use source::ExpressionSource;
