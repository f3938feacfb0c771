//! Language-tagged compiled expression.

use serde_json::Value;

use recflow_core::types::Record;

use crate::error::Result;
use crate::jmes::JmesPathExpression;
use crate::language::Language;
use crate::source::ExpressionSource;
use crate::sql::{SqlExpression, DEFAULT_STATEMENT_CACHE};

/// Immutable after compile and reusable across records. Not `Sync`: the SQL
/// variant owns a database connection.
pub enum CompiledExpression {
    Jmespath(JmesPathExpression),
    Sql(SqlExpression),
}

impl CompiledExpression {
    pub fn language(&self) -> Language {
        match self {
            CompiledExpression::Jmespath(_) => Language::Jmespath,
            CompiledExpression::Sql(_) => Language::Sql,
        }
    }

    /// Evaluate as a projection.
    pub fn search(&self, record: &Record) -> Result<Value> {
        match self {
            CompiledExpression::Jmespath(e) => e.search(record),
            CompiledExpression::Sql(e) => e.search(record),
        }
    }

    /// Evaluate as a predicate.
    pub fn test(&self, record: &Record) -> Result<bool> {
        match self {
            CompiledExpression::Jmespath(e) => e.test(record),
            CompiledExpression::Sql(e) => e.test(record),
        }
    }
}

impl std::fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            CompiledExpression::Jmespath(e) => e.text().to_string(),
            CompiledExpression::Sql(e) => e.source().display_text(),
        };
        f.debug_struct("CompiledExpression")
            .field("language", &self.language())
            .field("text", &text)
            .finish()
    }
}

pub fn compile(language: Language, source: &ExpressionSource) -> Result<CompiledExpression> {
    compile_with_cache(language, source, DEFAULT_STATEMENT_CACHE)
}

/// Like [`compile`], with an explicit prepared-statement cache size for SQL.
pub fn compile_with_cache(
    language: Language,
    source: &ExpressionSource,
    statement_cache: usize,
) -> Result<CompiledExpression> {
    Ok(match language {
        Language::Jmespath => CompiledExpression::Jmespath(JmesPathExpression::compile(source)?),
        Language::Sql => {
            CompiledExpression::Sql(SqlExpression::compile_with_cache(source, statement_cache)?)
        }
    })
}

/// Compile and discard: surfaces syntax errors without keeping resources.
pub fn check(language: Language, source: &ExpressionSource) -> Result<()> {
    compile_with_cache(language, source, 0).map(|_| ())
}
