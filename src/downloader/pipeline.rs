//! Pipeline sequencing, partial-failure policy and cancellation
//!
//! A run moves through four stages: fetching metadata, parsing it,
//! downloading pages, assembling. Metadata failures always abort. Page
//! failures are governed by the configured [`FailureMode`]. Cancellation is
//! cooperative: it is observed between pages only, and sends whatever pages
//! are complete straight to assembly.

use super::{DocDownloader, pages};
use crate::assemble;
use crate::config::FailureMode;
use crate::error::{Error, Result};
use crate::metadata;
use crate::types::{DocumentId, Event, PageFailure, PageResult, Stage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

impl DocDownloader {
    /// Download and assemble the document named by `input`
    ///
    /// `input` is a bare document code or a document URL containing one.
    /// Returns the artifact path on success. Aborts leave no artifact behind;
    /// page files already written stay on disk.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use doc88_dl::{Config, DocDownloader};
    /// # async fn example() -> doc88_dl::Result<()> {
    /// let downloader = DocDownloader::new(Config::default())?;
    /// let artifact = downloader.download("3995949474894").await?;
    /// println!("saved {}", artifact.display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(&self, input: &str) -> Result<PathBuf> {
        self.download_with_cancel(input, CancellationToken::new())
            .await
    }

    /// Download and assemble, observing `cancel` between pages
    ///
    /// Cancellation does not fail the run: in-flight work finishes, no new
    /// page downloads start, and the pages completed so far are assembled.
    /// Cancelling before any page completed fails assembly with no pages.
    pub async fn download_with_cancel(
        &self,
        input: &str,
        cancel: CancellationToken,
    ) -> Result<PathBuf> {
        let id = DocumentId::from_input(input)?;
        self.emit(Event::Started { id: id.clone() });

        match self.run(&id, cancel).await {
            Ok(path) => Ok(path),
            Err((stage, error)) => {
                tracing::error!(id = %id, stage = %stage, error = %error, "pipeline aborted");
                self.emit(Event::Failed {
                    stage,
                    error: error.to_string(),
                });
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        id: &DocumentId,
        cancel: CancellationToken,
    ) -> std::result::Result<PathBuf, (Stage, Error)> {
        let payload = metadata::fetch_payload(&self.client, &self.config.endpoint, id)
            .await
            .map_err(|e| (Stage::FetchingMetadata, e))?;

        let meta = metadata::parse_payload(&payload).map_err(|e| (Stage::ParsingMetadata, e))?;
        let total = meta.pages.len();
        tracing::info!(id = %id, name = %meta.name, pages = total, "document metadata resolved");
        self.emit(Event::MetadataResolved {
            id: id.clone(),
            name: meta.name.clone(),
            total_pages: total,
        });

        let dir = self.config.download.output_dir.join(&meta.name);
        std::fs::create_dir_all(&dir).map_err(|e| (Stage::DownloadingPages, Error::Io(e)))?;

        let mut results: Vec<PageResult> = Vec::with_capacity(total);
        let mut completed = 0usize;

        for (index, page) in meta.pages.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(id = %id, completed, total, "cancelled, assembling completed pages");
                self.emit(Event::Cancelled { completed, total });
                break;
            }

            match pages::download_page(
                &self.client,
                &self.config,
                &meta.asset_host,
                page,
                index,
                &dir,
            )
            .await
            {
                Ok(image) => {
                    completed += 1;
                    tracing::debug!(index, completed, total, "page downloaded");
                    self.emit(Event::PageComplete {
                        index,
                        completed,
                        total,
                    });
                    results.push(PageResult::Fetched(image));
                }
                Err(error @ Error::PageDownload(_)) => match self.config.download.failure_mode {
                    FailureMode::FailFast => {
                        return Err((Stage::DownloadingPages, error));
                    }
                    FailureMode::BestEffort => {
                        tracing::warn!(index, error = %error, "page failed, continuing without it");
                        self.emit(Event::PageFailed {
                            index,
                            error: error.to_string(),
                        });
                        results.push(PageResult::Failed(PageFailure {
                            index,
                            reason: error.to_string(),
                        }));
                    }
                },
                // Anything else (filesystem, config) is not a per-page matter.
                Err(error) => return Err((Stage::DownloadingPages, error)),
            }
        }

        let failed = results
            .iter()
            .filter(|r| matches!(r, PageResult::Failed(_)))
            .count();

        self.emit(Event::Assembling { pages: completed });
        let artifact_path = dir.join(format!("{}.{}", meta.name, self.converter.extension()));

        let converter = Arc::clone(&self.converter);
        let path = tokio::task::spawn_blocking(move || {
            assemble::assemble(converter.as_ref(), &results, &artifact_path)
        })
        .await
        .map_err(|e| {
            (
                Stage::Assembling,
                Error::Other(format!("assembly task failed: {e}")),
            )
        })?
        .map_err(|e| (Stage::Assembling, e))?;

        tracing::info!(id = %id, path = %path.display(), pages = completed, failed, "document assembled");
        self.emit(Event::Complete {
            path: path.clone(),
            pages: completed,
            failed,
        });
        Ok(path)
    }
}
