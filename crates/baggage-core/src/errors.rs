use crate::sourcemap::SourceMapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaggageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Source map error: {0}")]
    SourceMap(#[from] SourceMapError),
}

pub type Result<T> = std::result::Result<T, BaggageError>;
