//! Property shapes shared by several block kinds.

use serde::Deserialize;
use serde_json::Value;

use recflow_core::context::Context;
use recflow_core::path::FieldPath;
use recflow_core::types::is_internal_field;
use recflow_expr::{ExpressionSource, Language};

use crate::error::{BlockError, Result};

/// Either a single item inline, or a `fields` list of items.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many { fields: Vec<T> },
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many { fields } => fields,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// `{language, expression}` as declared.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionProps {
    pub language: Language,
    pub expression: Value,
}

impl ExpressionProps {
    pub fn source(&self) -> recflow_expr::Result<ExpressionSource> {
        ExpressionSource::from_value(self.language, &self.expression)
    }

    /// Parse and syntax-check the expression, keeping its source.
    pub fn checked_source(&self) -> Result<ExpressionSource> {
        let source = self.source()?;
        recflow_expr::check(self.language, &source)?;
        Ok(source)
    }
}

/// Parse a path a block reads, writes or deletes. Paths into the reserved
/// bookkeeping namespace are refused.
pub fn field_path(kind: &str, pointer: &str, raw: &str) -> Result<FieldPath> {
    let path = FieldPath::parse(raw).map_err(|e| BlockError::property(kind, pointer, e))?;
    if is_internal_field(path.root()) {
        return Err(BlockError::property(
            kind,
            pointer,
            format!("'{raw}' is a reserved internal field"),
        ));
    }
    Ok(path)
}

/// Prepared-statement cache size for SQL expressions, from the context.
pub fn statement_cache(ctx: &Context) -> usize {
    ctx.sql_statement_cache()
        .unwrap_or(recflow_expr::sql::DEFAULT_STATEMENT_CACHE)
}
