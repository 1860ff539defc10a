/// Errors from encoding or decoding typed payloads.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON serialization or deserialization failure.
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bincode serialization or deserialization failure.
    #[error("bincode codec error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
