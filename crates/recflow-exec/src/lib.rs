#![forbid(unsafe_code)]
//! recflow-exec: push batches of records through compiled jobs.
//!
//! The engine runs one batch at a time on the calling thread. Per-record
//! problems become `Outcome::Rejected`; a block that fails the whole batch
//! rejects every record and hands the input back untouched. Nothing here
//! returns an error to the caller of `run` or `transform`.

pub mod metrics;
pub mod runtime;
pub mod transform;

pub use runtime::{Engine, ExecError};
pub use transform::transform;
