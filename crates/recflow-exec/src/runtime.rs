//! Runtime: thread one batch through a job's steps.
//!
//! Behavior:
//! - The job is initialized on first use; later runs reuse it.
//! - Each step sees only the records that are still `Success`. Rejected and
//!   filtered records keep the data and outcome they had when they stopped.
//! - A step error, or a step output whose length does not match its input,
//!   fails the batch: every record is rejected with the error message, the
//!   input batch is returned as given, and later steps are skipped.
//! - Under `error_handling: abort` the first rejected record fails the batch
//!   the same way.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use recflow_blocks::BlockError;
use recflow_core::config::EngineConfig;
use recflow_core::context::Context;
use recflow_core::manifest::RunManifest;
use recflow_core::types::{BatchResult, Outcome, Record};
use recflow_planner::{ErrorHandling, Job, JobError};

use crate::metrics::emit_span;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("job compilation failed: {0}")]
    Compile(#[source] JobError),

    #[error("job initialization failed: {0}")]
    Init(#[source] JobError),

    #[error("step {index} ('{kind}') failed the batch: {reason}")]
    BatchExecution {
        index: usize,
        kind: String,
        reason: String,
    },
}

impl ExecError {
    fn step(index: usize, kind: &str, reason: impl ToString) -> Self {
        ExecError::BatchExecution {
            index,
            kind: kind.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Engine settings shared by every job it runs.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    cfg: EngineConfig,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Context carrying this engine's settings.
    pub fn context(&self) -> Context {
        Context::from_config(&self.cfg)
    }

    /// Compile with this engine's allow-list.
    pub fn compile(&self, declaration: &Value) -> Result<Job, ExecError> {
        recflow_planner::compile(declaration, self.cfg.allow_list()).map_err(ExecError::Compile)
    }

    /// Run one batch. Always returns one outcome per input record, in order.
    pub fn run(&self, job: &mut Job, batch: Vec<Record>, ctx: &Context) -> BatchResult {
        self.execute(job, batch, ctx).0
    }

    /// Like [`Engine::run`], also returning an audit manifest.
    pub fn run_with_manifest(
        &self,
        job: &mut Job,
        batch: Vec<Record>,
        ctx: &Context,
    ) -> (BatchResult, RunManifest) {
        let manifest = RunManifest::new(job.fingerprint(), batch.len(), now_ms());
        let (result, batch_error) = self.execute(job, batch, ctx);
        let manifest = manifest.finish(now_ms(), &result, batch_error);
        (result, manifest)
    }

    fn execute(
        &self,
        job: &mut Job,
        batch: Vec<Record>,
        ctx: &Context,
    ) -> (BatchResult, Option<String>) {
        if let Err(e) = job.init(ctx) {
            return fail(batch, ExecError::Init(e));
        }

        let started = Instant::now();
        let input = batch.clone();
        match run_steps(job, batch) {
            Ok(result) => {
                let (succeeded, rejected, filtered) = result.tally();
                emit_span(
                    "batch",
                    &[
                        ("records", result.len().to_string()),
                        ("succeeded", succeeded.to_string()),
                        ("rejected", rejected.to_string()),
                        ("filtered", filtered.to_string()),
                        ("elapsed_us", started.elapsed().as_micros().to_string()),
                    ],
                );
                (result, None)
            }
            Err(e) => fail(input, e),
        }
    }
}

fn fail(input: Vec<Record>, err: ExecError) -> (BatchResult, Option<String>) {
    let reason = err.to_string();
    warn!(records = input.len(), error = %reason, "batch failed");
    (BatchResult::rejected(input, &reason), Some(reason))
}

fn run_steps(job: &Job, batch: Vec<Record>) -> Result<BatchResult, ExecError> {
    let mut records = batch;
    let mut outcomes = vec![Outcome::Success; records.len()];
    let abort = job.error_handling() == ErrorHandling::Abort;

    for step in job.steps() {
        let live: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_success())
            .map(|(i, _)| i)
            .collect();
        if live.is_empty() {
            break;
        }

        let subset: Vec<Record> = live
            .iter()
            .map(|&i| std::mem::take(&mut records[i]))
            .collect();

        let started = Instant::now();
        let out = step
            .block()
            .run(subset)
            .map_err(|e: BlockError| ExecError::step(step.index(), step.kind(), e))?;

        if out.records.len() != live.len() || out.outcomes.len() != live.len() {
            return Err(ExecError::step(
                step.index(),
                step.kind(),
                format!(
                    "returned {} records and {} outcomes for {} inputs",
                    out.records.len(),
                    out.outcomes.len(),
                    live.len()
                ),
            ));
        }

        for ((&i, record), outcome) in live.iter().zip(out.records).zip(out.outcomes) {
            if abort {
                if let Outcome::Rejected(reason) = &outcome {
                    return Err(ExecError::step(
                        step.index(),
                        step.kind(),
                        format!("record {i} rejected: {reason}"),
                    ));
                }
            }
            records[i] = record;
            outcomes[i] = std::mem::replace(&mut outcomes[i], Outcome::Success).merge(outcome);
        }

        debug!(step = step.index(), kind = step.kind(), live = live.len(), "step done");
        emit_span(
            "step",
            &[
                ("index", step.index().to_string()),
                ("kind", step.kind().to_string()),
                ("records", live.len().to_string()),
                ("elapsed_us", started.elapsed().as_micros().to_string()),
            ],
        );
    }

    Ok(BatchResult { records, outcomes })
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
