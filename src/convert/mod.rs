//! Page-image conversion
//!
//! Merging fetched page images into a single artifact goes through the
//! [`PageConverter`] trait, keeping the document format pluggable:
//!
//! - [`PdfConverter`]: the default, builds a PDF with one page per image
//! - [`RawConverter`]: passes image bytes through untouched, for tests and
//!   callers that only want the images bundled
//!
//! ## Usage
//!
//! ```
//! use doc88_dl::convert::{PageConverter, RawConverter};
//!
//! let converter = RawConverter;
//! let page = converter.convert_page(b"image bytes")?;
//! let artifact = converter.merge_pages(&[page])?;
//! assert_eq!(artifact, b"image bytes");
//! # Ok::<(), doc88_dl::Error>(())
//! ```

mod pdf;
mod raw;

pub use pdf::PdfConverter;
pub use raw::RawConverter;

use crate::error::Result;

/// Converts page images into single-page document fragments and merges the
/// fragments into the final artifact
///
/// Both operations treat their input as opaque bytes. Implementations decide
/// the fragment and artifact formats, with one hard requirement:
/// `merge_pages` must keep the order of its input exactly, because that order
/// is the document's page order.
pub trait PageConverter: Send + Sync {
    /// Convert one raw page image into a single-page document fragment
    fn convert_page(&self, image: &[u8]) -> Result<Vec<u8>>;

    /// Merge fragments, in the given order, into the final artifact bytes
    fn merge_pages(&self, pages: &[Vec<u8>]) -> Result<Vec<u8>>;

    /// File extension of the artifact this converter produces, without the dot
    fn extension(&self) -> &'static str;
}
