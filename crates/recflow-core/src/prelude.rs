//! Convenient re-exports for downstream crates.

pub use crate::config::EngineConfig;
pub use crate::context::Context;
pub use crate::error::{Error, Result};
pub use crate::manifest::{ManifestId, RunManifest};
pub use crate::path::FieldPath;
pub use crate::types::{Batch, BatchResult, BlockOutput, Outcome, Record, Value};
