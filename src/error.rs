// src/error.rs

/// Failures on the write path. Read failures never surface as an error:
/// the fetcher degrades to the fallback dataset instead.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Write credential missing; raised before any network I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request body rejected; raised before any network I/O.
    #[error("validation error: {0}")]
    Validation(String),

    /// The append endpoint answered with a non-success status.
    #[error("append endpoint returned {status}: {body}")]
    UpstreamWrite { status: u16, body: String },

    /// The largest id already present leaves no room for another.
    #[error("no id available after {0}")]
    IdExhausted(i64),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
}
