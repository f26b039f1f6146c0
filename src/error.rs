// Error type shared by the library modules. The binary wraps these in
// `anyhow` with extra context; library callers can match on the variants.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UpdaterError>;

/// Infrastructure failures. A rejected login or a refused resume touch is
/// not an error: those come back as `Ok(false)`.
#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
