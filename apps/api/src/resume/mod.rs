//! Resume upload, text extraction, skills and metadata.

pub mod handlers;
pub mod metadata;
pub mod parser;
pub mod prompts;
pub mod storage;
pub mod upload;

use thiserror::Error;

pub use parser::ResumeParser;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Unsupported resume format: {0} (use .pdf, .txt or .md)")]
    UnsupportedFormat(String),

    #[error("No text could be extracted from the resume")]
    EmptyText,

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Resume storage failed: {0}")]
    Storage(String),

    #[error("Text extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
