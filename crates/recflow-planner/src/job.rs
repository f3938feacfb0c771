//! Compiled job: ordered blocks plus job-level settings.

use serde::{Deserialize, Serialize};
use tracing::debug;

use recflow_blocks::Block;
use recflow_core::context::Context;
use recflow_core::hash::Fingerprint;

use crate::error::{JobError, Result};

/// What a rejected record means for the rest of its batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandling {
    /// Report the record as rejected and keep going.
    #[default]
    Ignore,
    /// Fail the whole batch on the first rejected record.
    Abort,
}

/// One resolved step.
pub struct JobStep {
    index: usize,
    kind: String,
    block: Box<dyn Block>,
}

impl JobStep {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn block(&self) -> &dyn Block {
        self.block.as_ref()
    }
}

impl std::fmt::Debug for JobStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobStep")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The block list is fixed once compiled. `Send` but not `Sync`; compile one
/// job per worker to run batches concurrently.
#[derive(Debug)]
pub struct Job {
    steps: Vec<JobStep>,
    fingerprint: Fingerprint,
    error_handling: ErrorHandling,
    initialized: bool,
}

impl Job {
    pub(crate) fn new(
        steps: Vec<(String, Box<dyn Block>)>,
        fingerprint: Fingerprint,
        error_handling: ErrorHandling,
    ) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, (kind, block))| JobStep { index, kind, block })
            .collect();
        Self {
            steps,
            fingerprint,
            error_handling,
            initialized: false,
        }
    }

    pub fn steps(&self) -> &[JobStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// blake3 of the declaration this job was compiled from.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Initialize every block, in order. Runs at most once; later calls
    /// return immediately. A failed init may be retried.
    pub fn init(&mut self, ctx: &Context) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        for step in &mut self.steps {
            step.block.init(ctx).map_err(|source| JobError::Step {
                index: step.index,
                kind: step.kind.clone(),
                source,
            })?;
        }
        self.initialized = true;
        debug!(steps = self.steps.len(), fingerprint = %self.fingerprint, "job initialized");
        Ok(())
    }
}
