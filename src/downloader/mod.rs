//! Pipeline controller
//!
//! [`DocDownloader`] owns the HTTP client, the configuration, the page
//! converter and the event channel, and drives one document at a time through
//! fetch, parse, download and assembly:
//! - [`pages`] - sequential page fetching with retry
//! - [`pipeline`] - stage sequencing, partial-failure policy, cancellation

mod pages;
mod pipeline;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::convert::{PageConverter, PdfConverter};
use crate::error::{Error, Result};
use crate::types::Event;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Accept header sent with every request; the host checks that page image
/// requests look like they come from a browser
const ACCEPT_HEADER: &str = "image/webp,image/apng,image/*,*/*;q=0.8";

/// Document downloader (cloneable; all shared state is Arc-wrapped)
///
/// One instance can run any number of documents, one pipeline at a time per
/// call; pipelines share nothing but the client and configuration.
#[derive(Clone)]
pub struct DocDownloader {
    /// Shared HTTP client with the host headers and timeout applied
    pub(crate) client: reqwest::Client,
    /// Immutable configuration
    pub(crate) config: Arc<Config>,
    /// Conversion collaborator used by assembly
    pub(crate) converter: Arc<dyn PageConverter>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl DocDownloader {
    /// Build a downloader from `config` with the default [`PdfConverter`]
    pub fn new(config: Config) -> Result<Self> {
        Self::with_converter(config, Arc::new(PdfConverter))
    }

    /// Build a downloader with a custom page converter
    ///
    /// # Examples
    ///
    /// ```
    /// use doc88_dl::{Config, DocDownloader, RawConverter};
    /// use std::sync::Arc;
    ///
    /// let downloader = DocDownloader::with_converter(
    ///     Config::default(),
    ///     Arc::new(RawConverter),
    /// )?;
    /// # Ok::<(), doc88_dl::Error>(())
    /// ```
    pub fn with_converter(config: Config, converter: Arc<dyn PageConverter>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            header_value("user_agent", &config.endpoint.user_agent)?,
        );
        headers.insert(REFERER, header_value("referer", &config.endpoint.referer)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.endpoint.request_timeout)
            .build()?;

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            config: Arc::new(config),
            converter,
            event_tx,
        })
    }

    /// Subscribe to pipeline events
    ///
    /// Events are advisory progress signals; a lagged or dropped receiver
    /// never affects a pipeline's outcome.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this downloader was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn emit(&self, event: Event) {
        // Send only fails when no receiver exists, which is fine.
        let _ = self.event_tx.send(event);
    }
}

fn header_value(key: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Config {
        message: format!("invalid {key} header value: {e}"),
    })
}
