//! Expression text as declared: one expression, or a map of output field
//! to per-field expression.

use serde_json::Value;

use crate::error::{ExprError, Result};
use crate::language::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionSource {
    /// One expression producing one value.
    Scalar(String),
    /// Output field → expression; evaluates to an object.
    Fields(Vec<(String, String)>),
}

impl ExpressionSource {
    /// Interpret a declared `expression` property.
    ///
    /// Objects are field maps in both languages. For SQL, a string that
    /// parses as a JSON object of strings is a field map as well; any other
    /// string (including other valid JSON) is one raw SQL expression. JMESPath
    /// strings are always taken verbatim since `{...}` is already a
    /// multi-select hash there.
    pub fn from_value(language: Language, value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => {
                if language == Language::Sql {
                    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(s) {
                        if let Ok(fields) = fields_from_map(language, &map) {
                            return Ok(ExpressionSource::Fields(fields));
                        }
                    }
                }
                Ok(ExpressionSource::Scalar(s.clone()))
            }
            Value::Object(map) => Ok(ExpressionSource::Fields(fields_from_map(language, map)?)),
            other => Err(ExprError::compile(
                language,
                &other.to_string(),
                "expression must be a string or an object of strings",
            )),
        }
    }

    pub fn scalar(expr: impl Into<String>) -> Self {
        ExpressionSource::Scalar(expr.into())
    }

    /// Text used in logs and error messages.
    pub fn display_text(&self) -> String {
        match self {
            ExpressionSource::Scalar(s) => s.clone(),
            ExpressionSource::Fields(fields) => {
                let map: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                Value::Object(map).to_string()
            }
        }
    }
}

fn fields_from_map(
    language: Language,
    map: &serde_json::Map<String, Value>,
) -> Result<Vec<(String, String)>> {
    if map.is_empty() {
        return Err(ExprError::compile(language, "{}", "field map must not be empty"));
    }
    map.iter()
        .map(|(k, v)| match v {
            Value::String(expr) => Ok((k.clone(), expr.clone())),
            other => Err(ExprError::compile(
                language,
                &other.to_string(),
                format!("expression for field '{k}' must be a string"),
            )),
        })
        .collect()
}
