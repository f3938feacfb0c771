//! JMESPath expressions.

use once_cell::sync::Lazy;
use serde_json::Value;

use recflow_core::types::Record;

use crate::error::{ExprError, Result};
use crate::functions;
use crate::language::Language;
use crate::source::ExpressionSource;

/// Shared runtime: JMESPath built-ins plus our string helpers. Built once
/// and leaked, since compiled expressions borrow it for `'static` and the
/// runtime itself is not `Send`.
static RUNTIME: Lazy<&'static jmespath::Runtime> = Lazy::new(|| {
    let mut runtime = jmespath::Runtime::new();
    runtime.register_builtin_functions();
    functions::register(&mut runtime);
    Box::leak(Box::new(runtime))
});

pub struct JmesPathExpression {
    text: String,
    projection: jmespath::Expression<'static>,
    /// `[?(expr)]`, evaluated over `[record]` for predicate tests.
    predicate: jmespath::Expression<'static>,
}

impl JmesPathExpression {
    pub fn compile(source: &ExpressionSource) -> Result<Self> {
        let text = match source {
            ExpressionSource::Scalar(s) => s.clone(),
            ExpressionSource::Fields(fields) => multiselect_hash(fields),
        };
        let projection = RUNTIME
            .compile(&text)
            .map_err(|e| ExprError::compile(Language::Jmespath, &text, e))?;
        let predicate = RUNTIME
            .compile(&format!("[?({text})]"))
            .map_err(|e| ExprError::compile(Language::Jmespath, &text, e))?;
        Ok(Self {
            text,
            projection,
            predicate,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn search(&self, record: &Record) -> Result<Value> {
        let found = self
            .projection
            .search(record)
            .map_err(|e| ExprError::eval(Language::Jmespath, e))?;
        serde_json::to_value(&*found).map_err(|e| ExprError::eval(Language::Jmespath, e))
    }

    pub fn test(&self, record: &Record) -> Result<bool> {
        let matched = self
            .predicate
            .search(std::slice::from_ref(record))
            .map_err(|e| ExprError::eval(Language::Jmespath, e))?;
        Ok(matched.as_array().map_or(false, |hits| !hits.is_empty()))
    }
}

/// `{"a": (x), "b c": (y)}` from a field map. Keys are JSON-quoted so any
/// field name survives as a quoted identifier.
fn multiselect_hash(fields: &[(String, String)]) -> String {
    let pairs: Vec<String> = fields
        .iter()
        .map(|(name, expr)| format!("{}: ({})", Value::String(name.clone()), expr))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}
