use thiserror::Error;

use recflow_expr::ExprError;

pub type Result<T> = std::result::Result<T, BlockError>;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block '{kind}' is not in the allowed block list")]
    NotAllowed { kind: String },

    #[error("unknown block kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("invalid properties for block '{kind}' at '{path}': {reason}")]
    PropertyValidation {
        kind: String,
        path: String,
        reason: String,
    },

    #[error("block '{kind}' ships an unusable property schema: {reason}")]
    Schema { kind: String, reason: String },

    #[error(transparent)]
    Expression(#[from] ExprError),

    #[error("block '{0}' used before init")]
    NotInitialized(&'static str),

    #[error("block execution failed: {0}")]
    Execution(String),
}

impl BlockError {
    pub fn property(kind: &str, path: impl Into<String>, reason: impl ToString) -> Self {
        let path = path.into();
        BlockError::PropertyValidation {
            kind: kind.to_string(),
            path: if path.is_empty() { "/".to_string() } else { path },
            reason: reason.to_string(),
        }
    }
}
