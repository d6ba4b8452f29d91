//! Core types and events for doc88-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque identifier naming a remote document (the host calls it `p_code`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive an identifier from user input
    ///
    /// Accepts either a bare code or a document URL of the shape
    /// `.../p-<code>.<suffix>`, from which the code is the substring between
    /// `/p-` and the first following dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc88_dl::DocumentId;
    ///
    /// let from_url = DocumentId::from_input("https://m.doc88.com/p-3995949474894.html").unwrap();
    /// let bare = DocumentId::from_input("3995949474894").unwrap();
    /// assert_eq!(from_url, bare);
    /// ```
    pub fn from_input(input: &str) -> Result<Self> {
        let input = input.trim();
        if let Some((_, rest)) = input.split_once("/p-") {
            let code = rest.split('.').next().unwrap_or("");
            if code.is_empty() {
                return Err(Error::UserInput(format!(
                    "no document code found in URL {input:?}"
                )));
            }
            return Ok(Self(code.to_string()));
        }
        if input.is_empty() || input.contains('/') {
            return Err(Error::UserInput(format!(
                "cannot derive a document code from {input:?}"
            )));
        }
        Ok(Self(input.to_string()))
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_input(s)
    }
}

/// Minimal per-page record needed to build a page asset URL
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Asset identifier the host embeds in the page image URL
    #[serde(rename = "u")]
    pub asset_id: String,
}

/// Structured document index recovered from the opaque payload
///
/// The page order is the order the server enumerated them in, and it is the
/// canonical page order of the final artifact. It is never re-sorted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Base URL for page assets
    pub asset_host: String,
    /// Display name, already sanitized for filesystem use
    pub name: String,
    /// Ordered page list
    pub pages: Vec<PageDescriptor>,
}

/// Raw image bytes for one page
#[derive(Clone, Debug)]
pub struct PageImage {
    /// Zero-based index equal to the page's position in the descriptor list
    pub index: usize,
    /// Image bytes as served by the asset host
    pub bytes: Vec<u8>,
}

/// Failure record for one page after its retry budget was spent
#[derive(Clone, Debug)]
pub struct PageFailure {
    /// Zero-based page index
    pub index: usize,
    /// Human-readable reason from the last attempt
    pub reason: String,
}

/// Outcome of fetching one page
#[derive(Clone, Debug)]
pub enum PageResult {
    /// Page downloaded; the image is available for assembly
    Fetched(PageImage),
    /// Retry budget exhausted; the page slot stays empty
    Failed(PageFailure),
}

impl PageResult {
    /// The fetched image, if this page succeeded
    pub fn image(&self) -> Option<&PageImage> {
        match self {
            PageResult::Fetched(image) => Some(image),
            PageResult::Failed(_) => None,
        }
    }

    /// Zero-based page index of this result
    pub fn index(&self) -> usize {
        match self {
            PageResult::Fetched(image) => image.index,
            PageResult::Failed(failure) => failure.index,
        }
    }
}

/// Pipeline stage, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Requesting the opaque index payload
    FetchingMetadata,
    /// Decoding and parsing the payload
    ParsingMetadata,
    /// Fetching page images one at a time
    DownloadingPages,
    /// Merging fetched pages into the artifact
    Assembling,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::FetchingMetadata => "fetching_metadata",
            Stage::ParsingMetadata => "parsing_metadata",
            Stage::DownloadingPages => "downloading_pages",
            Stage::Assembling => "assembling",
        };
        write!(f, "{name}")
    }
}

/// Event emitted during a pipeline run
///
/// Events are advisory progress signals for front ends; dropping or missing
/// one never changes the pipeline outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An identifier was accepted and the pipeline started
    Started {
        /// Document identifier
        id: DocumentId,
    },

    /// Metadata decoded; the page count is known
    MetadataResolved {
        /// Document identifier
        id: DocumentId,
        /// Sanitized document name
        name: String,
        /// Number of pages the server enumerated
        total_pages: usize,
    },

    /// One page finished downloading
    PageComplete {
        /// Zero-based page index
        index: usize,
        /// Pages completed so far
        completed: usize,
        /// Total page count
        total: usize,
    },

    /// One page failed after exhausting retries (best-effort mode only)
    PageFailed {
        /// Zero-based page index
        index: usize,
        /// Human-readable failure reason
        error: String,
    },

    /// Cancellation observed; assembling the pages completed so far
    Cancelled {
        /// Pages completed before cancellation
        completed: usize,
        /// Total page count
        total: usize,
    },

    /// Assembly started
    Assembling {
        /// Number of pages being merged
        pages: usize,
    },

    /// Artifact written
    Complete {
        /// Path of the final artifact
        path: PathBuf,
        /// Pages included in the artifact
        pages: usize,
        /// Pages that failed and were left out
        failed: usize,
    },

    /// Pipeline aborted
    Failed {
        /// Stage that was running when the pipeline aborted
        stage: Stage,
        /// Human-readable failure reason
        error: String,
    },
}
