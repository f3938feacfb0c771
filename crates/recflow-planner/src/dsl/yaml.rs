//! Job declarations as written by users.
//!
//! Example:
//! ```yaml
//! error_handling: ignore
//! steps:
//!   - uses: add_field
//!     with:
//!       field: full_name
//!       language: jmespath
//!       expression: join(' ', [fname, lname])
//!   - uses: remove_field
//!     with:
//!       fields:
//!         - field: fname
//!         - field: lname
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::job::ErrorHandling;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub error_handling: ErrorHandling,
    pub steps: Vec<StepDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDecl {
    /// Registered block kind.
    pub uses: String,
    /// Block properties; `{}` when omitted.
    #[serde(default = "empty_object")]
    pub with: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Parse a YAML job document into its JSON form. Structural checks happen
/// later, in `compile`/`validate`.
pub fn parse_yaml_job(yaml_src: &str) -> Result<Value> {
    Ok(serde_yaml::from_str(yaml_src)?)
}
