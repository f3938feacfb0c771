//! Block trait + construction contract.
//!
//! The engine calls `init(...)` once before the first batch, then `run(...)`
//! for every batch. `run` receives only records that are still live and must
//! hand back exactly one record and one outcome per input, in order.

use serde_json::Value;

use recflow_core::context::Context;
use recflow_core::types::{BlockOutput, Record};

use crate::error::Result;

/// Trait that all blocks must implement.
///
/// Invariants:
/// - `init` is idempotent: calling it again rebuilds the same state.
/// - `run` never turns a record into a success it was not given as one; it
///   reports per-record problems as `Outcome::Rejected` and only returns
///   `Err` when the whole batch cannot be processed.
pub trait Block: Send {
    /// Registered kind name (stable).
    fn kind(&self) -> &'static str;

    /// Compile expressions and pick up shared resources.
    fn init(&mut self, ctx: &Context) -> Result<()>;

    /// Transform one batch.
    fn run(&self, records: Vec<Record>) -> Result<BlockOutput>;
}

/// A block kind the registry can construct from a property object.
pub trait BlockKind: Block + Sized + 'static {
    const KIND: &'static str;

    /// Validate `properties` against the kind's schema and build the block.
    fn from_properties(properties: &Value) -> Result<Self>;
}
