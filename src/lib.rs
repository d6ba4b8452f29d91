//! # doc88-dl
//!
//! Backend library for downloading paginated documents from the doc88 host
//! and assembling them into a single artifact.
//!
//! The host serves a document's page index as an obfuscated payload. This
//! crate decodes that payload ([`codec`]), fetches every page image
//! sequentially with bounded retry, and merges the pages in server order into
//! one output document, a PDF by default.
//!
//! ## Design Philosophy
//!
//! doc88-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to progress events, no polling
//! - **Explicit about failure** - Callers pick fail-fast or best-effort;
//!   neither is silently assumed
//!
//! ## Quick Start
//!
//! ```no_run
//! use doc88_dl::{Config, DocDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = DocDownloader::new(Config::default())?;
//!
//!     // Subscribe to progress events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{event:?}");
//!         }
//!     });
//!
//!     // Accepts a bare code or a document URL
//!     let artifact = downloader.download("3995949474894").await?;
//!     println!("saved to {}", artifact.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Page assembly
pub mod assemble;
/// Obfuscated payload codec
pub mod codec;
/// Configuration types
pub mod config;
/// Page-image conversion
pub mod convert;
/// Pipeline controller
pub mod downloader;
/// Error types
pub mod error;
/// Metadata fetch and payload parsing
pub mod metadata;
/// Retry logic with backoff
pub mod retry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, CourtesyDelay, DownloadConfig, EndpointConfig, FailureMode, RetryConfig};
pub use convert::{PageConverter, PdfConverter, RawConverter};
pub use downloader::DocDownloader;
pub use error::{AssemblyError, Error, PageDownloadError, Result};
pub use types::{
    DocumentId, DocumentMetadata, Event, PageDescriptor, PageFailure, PageImage, PageResult, Stage,
};
