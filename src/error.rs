//! Error types for doc88-dl
//!
//! One top-level [`Error`] enum covers the whole pipeline. The two stages with
//! richer failure shapes (page downloads and assembly) get their own nested
//! types, converted with `#[from]`.

use thiserror::Error;

/// Result type alias for doc88-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for doc88-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration value could not be applied (bad header value, invalid URL)
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of the invalid setting
        message: String,
    },

    /// HTTP transport failure (connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned status {status} for {url}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The opaque payload did not decode into the expected document structure
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A page exhausted its retry budget
    #[error(transparent)]
    PageDownload(#[from] PageDownloadError),

    /// Assembly of the final artifact failed
    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document identifier could not be derived from the supplied text
    #[error("invalid input: {0}")]
    UserInput(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failure record for a single page after all attempts were spent
#[derive(Debug, Error)]
#[error("page {index} failed: {reason}")]
pub struct PageDownloadError {
    /// Zero-based page index
    pub index: usize,
    /// The last error observed for this page
    pub reason: String,
}

/// Assembly errors
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Not a single page image is available to merge
    #[error("no pages available to assemble")]
    NoPages,

    /// A page image could not be converted into a document page
    #[error("cannot convert page: {0}")]
    Conversion(String),

    /// Converted pages could not be merged into one document
    #[error("cannot merge pages: {0}")]
    Merge(String),
}
