#![forbid(unsafe_code)]
//! recflow-planner: job declaration → executable `Job`.
//!
//! Design:
//! - A declaration is plain JSON (or YAML parsed into JSON) checked against
//!   an embedded job schema before anything else.
//! - Each step is resolved through a `recflow_blocks::Registry`, in order;
//!   the first failing step is reported with its index and kind.
//! - `validate` and `compile` run exactly the same checks.

pub mod compile;
pub mod dsl;
pub mod error;
pub mod job;
pub mod schema;

pub use compile::{compile, compile_with_registry, validate, validate_with_registry};
pub use dsl::yaml::{parse_yaml_job, JobDecl, StepDecl};
pub use error::{JobError, Result};
pub use job::{ErrorHandling, Job, JobStep};
