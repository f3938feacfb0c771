//! Declaration → `Job`.

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use recflow_blocks::Registry;
use recflow_core::hash::hash_serde;

use crate::dsl::yaml::JobDecl;
use crate::error::{JobError, Result};
use crate::job::Job;
use crate::schema::validate_job;

static BUILTINS: Lazy<Registry> = Lazy::new(Registry::with_builtins);

/// Compile against the built-in block kinds.
///
/// `allow_list`: `None` allows every registered kind; `Some(list)` allows
/// only the kinds named in `list`.
pub fn compile(declaration: &Value, allow_list: Option<&[String]>) -> Result<Job> {
    compile_with_registry(&BUILTINS, declaration, allow_list)
}

/// Run the same checks as [`compile`] and discard the job.
pub fn validate(declaration: &Value, allow_list: Option<&[String]>) -> Result<()> {
    validate_with_registry(&BUILTINS, declaration, allow_list)
}

pub fn validate_with_registry(
    registry: &Registry,
    declaration: &Value,
    allow_list: Option<&[String]>,
) -> Result<()> {
    compile_with_registry(registry, declaration, allow_list).map(|_| ())
}

/// Compile against a host-supplied registry.
pub fn compile_with_registry(
    registry: &Registry,
    declaration: &Value,
    allow_list: Option<&[String]>,
) -> Result<Job> {
    validate_job(declaration)?;
    let decl: JobDecl =
        serde_json::from_value(declaration.clone()).map_err(|e| JobError::schema("", e))?;
    let fingerprint = hash_serde(declaration)?;

    let mut steps = Vec::with_capacity(decl.steps.len());
    for (index, step) in decl.steps.into_iter().enumerate() {
        let block = registry
            .create(&step.uses, &step.with, allow_list)
            .map_err(|source| JobError::Step {
                index,
                kind: step.uses.clone(),
                source,
            })?;
        steps.push((step.uses, block));
    }

    debug!(steps = steps.len(), fingerprint = %fingerprint, "job compiled");
    Ok(Job::new(steps, fingerprint, decl.error_handling))
}
