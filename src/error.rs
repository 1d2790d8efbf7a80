//! Error type shared by every pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Unsupported file type: {0}. Use .xlsx/.xls/.csv")]
    UnsupportedFormat(String),

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing expected columns: {}", .0.join(", "))]
    Schema(Vec<String>),

    #[error("No rows left after filtering: {0}")]
    EmptyResult(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        PipelineError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
