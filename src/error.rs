use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Template not found for '{variant}' (searched {path})")]
    TemplateNotFound { variant: String, path: PathBuf },

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCellReference(String),

    #[error("Cell out of range: {0}")]
    CellOutOfRange(String),

    #[error("Cell is covered by a merged region and cannot be written: {0}")]
    MergedCellWrite(String),

    #[error("Number {0} is outside the range that can be spelled out")]
    NumberOutOfRange(u64),

    #[error("Invalid monetary amount: {0}")]
    InvalidAmount(String),

    #[error("Client data extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Template format error: {0}")]
    TemplateFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
