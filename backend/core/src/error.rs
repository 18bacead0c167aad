use thiserror::Error;

/// Top-level error type for ShelfScan collaborators.
///
/// Extraction and ledger updates never fail; these variants cover the
/// plumbing around them (vision calls and image loading).
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("label analysis failed ({provider}): {message}")]
    Analysis { provider: String, message: String },

    #[error("label analysis returned no text ({provider})")]
    EmptyResponse { provider: String },

    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
