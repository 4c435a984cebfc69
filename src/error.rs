//! Error Module
//! Failure taxonomy shared by every pipeline stage.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every polars failure we can hit is a structural problem with a table.
impl From<PolarsError> for AnalysisError {
    fn from(err: PolarsError) -> Self {
        AnalysisError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
