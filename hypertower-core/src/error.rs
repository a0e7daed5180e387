/// Errors raised by the parameter and export surfaces.
///
/// The geometry functions themselves are total and never return these.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The query string could not be tokenized.
    #[error("malformed parameter query at {position}: {message}")]
    Query { position: usize, message: String },

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("invalid value `{value}` for parameter `{key}`: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("export failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
