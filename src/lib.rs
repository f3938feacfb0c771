#![forbid(unsafe_code)]
//! recflow: declarative record-transformation pipelines.
//!
//! A job declaration lists blocks (`add_field`, `remove_field`,
//! `rename_field`, `map`, `filter`, or host-registered kinds). `compile`
//! turns it into a [`Job`]; [`Engine::run`] pushes batches of JSON records
//! through it and reports one [`Outcome`] per record. [`transform`] does
//! both in one call and never fails.
//!
//! ```no_run
//! use serde_json::json;
//!
//! let job = json!({"steps": [{"uses": "add_field", "with": {
//!     "field": "full_name",
//!     "language": "jmespath",
//!     "expression": "join(' ', [fname, lname])"
//! }}]});
//! let batch = vec![json!({"fname": "john", "lname": "doe"})
//!     .as_object()
//!     .cloned()
//!     .unwrap()];
//! let result = recflow::transform(&job, batch, None, None);
//! assert_eq!(result.records[0]["full_name"], "john doe");
//! ```

pub use recflow_blocks::{Block, BlockError, BlockKind, Registry};
pub use recflow_core::prelude::*;
pub use recflow_exec::{transform, Engine, ExecError};
pub use recflow_expr::{ExprError, ExpressionSource, Language};
pub use recflow_planner::{
    compile, compile_with_registry, parse_yaml_job, validate, validate_with_registry,
    ErrorHandling, Job, JobError,
};
