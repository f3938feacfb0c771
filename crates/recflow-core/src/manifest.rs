//! Run manifest for audit: which job ran, on how many records, with what
//! result, and when.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::Fingerprint;
use crate::types::BatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(pub Uuid);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub id: ManifestId,

    /// Stable hash of the job declaration that produced the pipeline.
    pub job_hash: Fingerprint,

    /// Engine version string for provenance.
    pub engine_version: String,

    pub records_in: usize,
    pub succeeded: usize,
    pub rejected: usize,
    pub filtered: usize,

    /// Set when the whole batch failed at block level.
    pub batch_error: Option<String>,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl RunManifest {
    pub fn new(job_hash: Fingerprint, records_in: usize, started_ms: u64) -> Self {
        Self {
            id: ManifestId(Uuid::new_v4()),
            job_hash,
            engine_version: crate::VERSION.to_string(),
            records_in,
            succeeded: 0,
            rejected: 0,
            filtered: 0,
            batch_error: None,
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(mut self, finished_ms: u64, result: &BatchResult, batch_error: Option<String>) -> Self {
        let (succeeded, rejected, filtered) = result.tally();
        self.succeeded = succeeded;
        self.rejected = rejected;
        self.filtered = filtered;
        self.batch_error = batch_error;
        self.finished_ms = finished_ms;
        self
    }
}
