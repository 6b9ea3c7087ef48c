use thiserror::Error;

/// Errors that can occur while processing a gesture.
///
/// Short or degenerate tracks are not errors: they simply produce no
/// output. Only bad configuration and CLI I/O end up here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrackError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid sample {index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
