use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A spreadsheet that could not be read. Reported per file; never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to read {filename}: {cause}")]
pub struct ParseError {
    pub filename: String,
    pub cause: String,
}

impl ParseError {
    pub fn new(filename: impl Into<String>, cause: impl Into<String>) -> Self {
        Self { filename: filename.into(), cause: cause.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
