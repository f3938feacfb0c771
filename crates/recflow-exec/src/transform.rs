//! One-shot entry point: compile, initialize, run.

use serde_json::Value;
use tracing::warn;

use recflow_core::context::Context;
use recflow_core::types::{BatchResult, Record};

use crate::runtime::{Engine, ExecError};

/// Compile `declaration` and run `batch` through it.
///
/// Never fails: a declaration that does not compile, or a job that cannot be
/// initialized, rejects every record with the error message and returns the
/// batch unchanged. Hosts running many batches should `compile` once and
/// call [`Engine::run`] instead.
pub fn transform(
    declaration: &Value,
    batch: Vec<Record>,
    ctx: Option<&Context>,
    allow_list: Option<&[String]>,
) -> BatchResult {
    let mut job = match recflow_planner::compile(declaration, allow_list) {
        Ok(job) => job,
        Err(e) => {
            let reason = ExecError::Compile(e).to_string();
            warn!(records = batch.len(), error = %reason, "transform rejected batch");
            return BatchResult::rejected(batch, &reason);
        }
    };

    let fallback;
    let ctx = match ctx {
        Some(ctx) => ctx,
        None => {
            fallback = Context::new();
            &fallback
        }
    };
    Engine::default().run(&mut job, batch, ctx)
}
