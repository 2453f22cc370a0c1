use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("Malformed source map: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported source map version {0}, expected 3")]
    UnsupportedVersion(u64),

    #[error("Invalid base64 character '{character}' in mappings")]
    InvalidBase64 { character: char },

    #[error("Unterminated VLQ sequence in mappings")]
    UnterminatedVlq,

    #[error("VLQ value out of range in mappings")]
    VlqOverflow,

    #[error("Segment with {fields} fields on generated line {line} (expected 1, 4 or 5)")]
    InvalidSegment { line: usize, fields: usize },

    #[error("{kind} {value} out of range on generated line {line}")]
    OutOfRange {
        kind: &'static str,
        value: i64,
        line: usize,
    },
}

pub type Result<T> = std::result::Result<T, SourceMapError>;
