use thiserror::Error;

use crate::language::Language;

/// Result type local to recflow-expr.
pub type Result<T> = std::result::Result<T, ExprError>;

#[derive(Debug, Error)]
pub enum ExprError {
    #[error("cannot compile {language} expression '{expression}': {reason}")]
    Compile {
        language: Language,
        expression: String,
        reason: String,
    },

    #[error("{language} evaluation failed: {reason}")]
    Eval { language: Language, reason: String },
}

impl ExprError {
    pub fn compile(language: Language, expression: &str, reason: impl ToString) -> Self {
        ExprError::Compile {
            language,
            expression: expression.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn eval(language: Language, reason: impl ToString) -> Self {
        ExprError::Eval {
            language,
            reason: reason.to_string(),
        }
    }
}
