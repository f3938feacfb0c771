//! JSON Schema validation of block property objects.

use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BlockError, Result};

/// A kind's compiled property schema. Built lazily, once per process.
pub struct PropertySchema {
    kind: &'static str,
    validator: std::result::Result<Validator, String>,
}

impl PropertySchema {
    pub fn new(kind: &'static str, source: &str) -> Self {
        let validator = serde_json::from_str::<Value>(source)
            .map_err(|e| e.to_string())
            .and_then(|schema| jsonschema::validator_for(&schema).map_err(|e| e.to_string()));
        Self { kind, validator }
    }

    /// First violation wins; it names the instance path and the failed
    /// constraint.
    pub fn validate(&self, properties: &Value) -> Result<()> {
        let validator = self.validator.as_ref().map_err(|reason| BlockError::Schema {
            kind: self.kind.to_string(),
            reason: reason.clone(),
        })?;
        if let Some(err) = validator.iter_errors(properties).next() {
            return Err(BlockError::property(
                self.kind,
                err.instance_path.to_string(),
                &err,
            ));
        }
        Ok(())
    }

    /// Validate, then deserialize into the block's typed properties.
    pub fn parse<T: DeserializeOwned>(&self, properties: &Value) -> Result<T> {
        self.validate(properties)?;
        serde_json::from_value(properties.clone())
            .map_err(|e| BlockError::property(self.kind, "", e))
    }
}
