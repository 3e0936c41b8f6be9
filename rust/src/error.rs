//! Error types for repo-lens.
//!
//! One `thiserror` enum per layer; the binary wraps them in `anyhow`.

use thiserror::Error;

/// Errors raised while turning source text into a [`CodeStructure`](crate::parser::CodeStructure).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unsupported language for {0}")]
    UnsupportedLanguage(String),

    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parser setup failed: {0}")]
    Setup(String),
}

/// Errors raised by a summarizer backend.
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No choices in API response")]
    EmptyResponse,
}

/// Errors raised by the on-disk cache and history stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),
}

/// Errors raised by a full analysis run.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("File is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
