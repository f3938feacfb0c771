#![forbid(unsafe_code)]
//! recflow-core: shared vocabulary for the pipeline crates.
//!
//! Pure data and helpers only: the record/value model, per-record outcomes,
//! escaped field paths, the host-supplied `Context`, engine configuration,
//! stable hashing and the run manifest. Nothing here evaluates expressions
//! or touches the filesystem.

pub mod config;
pub mod context;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod path;
pub mod prelude;
pub mod types;

pub use error::{Error, Result};

/// Engine version string stamped into run manifests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
