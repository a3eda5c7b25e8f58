//! Error types for the medsum library.

use std::io;
use thiserror::Error;

/// Result type alias for medsum operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while preparing or rendering a summary document.
///
/// Only [`Error::Encode`] is expected to reach an end user in production: font
/// problems are absorbed by the fallback font, malformed inline markup is
/// literal text, and unknown page sizes resolve to A4.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A font file could not be used for embedding.
    #[error("Font error: {0}")]
    Font(String),

    /// The PDF encoder failed to build the document.
    ///
    /// The detail is kept for logging but never shown in the message.
    #[error("document generation failed")]
    Encode {
        /// Internal failure description
        detail: String,
    },

    /// The upstream generator payload could not be understood.
    #[error("Invalid summary payload: {0}")]
    InvalidPayload(String),

    /// Error reading back a PDF document.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an encoder failure from any displayable cause.
    pub fn encode(detail: impl std::fmt::Display) -> Self {
        Error::Encode {
            detail: detail.to_string(),
        }
    }

    /// Whether this is the opaque document-generation failure.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Error::Encode { .. })
    }

    /// Internal detail for logs; falls back to the display string.
    pub fn detail(&self) -> String {
        match self {
            Error::Encode { detail } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidPayload(err.to_string())
    }
}
