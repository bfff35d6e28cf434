//! Error types for unlegacy library.

use std::io;
use thiserror::Error;

/// Result type alias for unlegacy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling a document.
///
/// Most ordering mistakes made by a decoder never surface here: the
/// assembler absorbs them and logs a warning. Only conditions that prove the
/// producer's bookkeeping is inconsistent are reported as errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading scripts or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A page span was requested beyond the sequence declared up front.
    #[error("Page {page} requested but only {available} pages were declared")]
    PageSpanExhausted {
        /// 1-indexed physical page that could not be placed
        page: u32,
        /// Total number of pages covered by the declared page spans
        available: u32,
    },

    /// A decoder failed while replaying content.
    #[error("Decoder error: {0}")]
    Decoder(String),

    /// An event script is malformed.
    #[error("Script error: {0}")]
    Script(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error must abort the whole conversion.
    ///
    /// Fatal errors are propagated through sub-document replay instead of
    /// being absorbed there.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::PageSpanExhausted { .. } | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageSpanExhausted {
            page: 4,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Page 4 requested but only 3 pages were declared"
        );

        let err = Error::Decoder("bad zone".into());
        assert_eq!(err.to_string(), "Decoder error: bad zone");
    }

    #[test]
    fn test_is_fatal() {
        assert!(Error::PageSpanExhausted {
            page: 2,
            available: 1
        }
        .is_fatal());
        assert!(!Error::Decoder("x".into()).is_fatal());
        assert!(!Error::Script("x".into()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
