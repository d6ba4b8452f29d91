//! Sequential page fetching with retry
//!
//! One page in flight at a time. Each page gets the full retry budget from
//! the configured policy, an optional courtesy delay before every attempt,
//! and its bytes written to disk under a zero-padded index name so a
//! directory listing sorts in page order.

use crate::config::Config;
use crate::error::{Error, PageDownloadError, Result};
use crate::retry;
use crate::types::{PageDescriptor, PageImage};
use rand::Rng;
use std::path::Path;

/// Fetch one page image, honoring the retry policy
///
/// On success the image bytes are written to `dir` as `<index:07>.gif` and
/// returned for assembly. A spent retry budget comes back as
/// [`PageDownloadError`]; filesystem failures surface as I/O errors and are
/// not a per-page matter.
pub(crate) async fn download_page(
    client: &reqwest::Client,
    config: &Config,
    asset_host: &str,
    page: &PageDescriptor,
    index: usize,
    dir: &Path,
) -> Result<PageImage> {
    let url = format!(
        "{}/get-{}.gif",
        asset_host.trim_end_matches('/'),
        page.asset_id
    );

    let bytes = retry::with_backoff(&config.retry, || fetch_image(client, config, &url))
        .await
        .map_err(|error| PageDownloadError {
            index,
            reason: error.to_string(),
        })?;

    let path = dir.join(format!("{index:07}.gif"));
    tokio::fs::write(&path, &bytes).await?;

    Ok(PageImage { index, bytes })
}

/// One fetch attempt, with the courtesy delay applied first
async fn fetch_image(client: &reqwest::Client, config: &Config, url: &str) -> Result<Vec<u8>> {
    if let Some(delay) = &config.download.courtesy_delay {
        let wait = if delay.max > delay.min {
            rand::thread_rng().gen_range(delay.min..=delay.max)
        } else {
            delay.min
        };
        tokio::time::sleep(wait).await;
    }

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}
