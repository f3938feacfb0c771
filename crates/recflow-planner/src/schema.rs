//! Embedded job schema.

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{JobError, Result};

static JOB_SCHEMA: Lazy<std::result::Result<Validator, String>> = Lazy::new(|| {
    serde_json::from_str::<Value>(include_str!("../schemas/job.schema.json"))
        .map_err(|e| e.to_string())
        .and_then(|schema| jsonschema::validator_for(&schema).map_err(|e| e.to_string()))
});

/// Check a declaration's overall shape. Reports the first violation.
pub fn validate_job(declaration: &Value) -> Result<()> {
    let validator = JOB_SCHEMA
        .as_ref()
        .map_err(|reason| JobError::schema("", format!("job schema unusable: {reason}")))?;
    if let Some(err) = validator.iter_errors(declaration).next() {
        return Err(JobError::schema(err.instance_path.to_string(), &err));
    }
    Ok(())
}
