use thiserror::Error;

use recflow_blocks::BlockError;

pub type Result<T> = std::result::Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job declaration at '{path}': {reason}")]
    JobSchema { path: String, reason: String },

    #[error("step {index} ('{kind}'): {source}")]
    Step {
        index: usize,
        kind: String,
        #[source]
        source: BlockError,
    },

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Core(#[from] recflow_core::Error),
}

impl JobError {
    pub fn schema(path: impl Into<String>, reason: impl ToString) -> Self {
        let path = path.into();
        JobError::JobSchema {
            path: if path.is_empty() { "/".to_string() } else { path },
            reason: reason.to_string(),
        }
    }

    /// The step at fault, if any.
    pub fn step(&self) -> Option<(usize, &str)> {
        match self {
            JobError::Step { index, kind, .. } => Some((*index, kind.as_str())),
            _ => None,
        }
    }
}
