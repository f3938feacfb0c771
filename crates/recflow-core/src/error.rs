use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed field path '{0}': trailing unescaped backslash")]
    MalformedPath(String),

    #[error("cannot traverse '{segment}' in '{path}': not an object")]
    NotAnObject { path: String, segment: String },

    #[error("hashing error: {0}")]
    Hash(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
