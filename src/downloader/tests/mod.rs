//! Downloader test suite
//!
//! Pipelines run against a wiremock server standing in for both the metadata
//! endpoint and the asset host, with [`RawConverter`] so artifacts can be
//! compared byte-for-byte.


use crate::codec;
use crate::config::{Config, FailureMode};
use crate::convert::RawConverter;
use crate::downloader::DocDownloader;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Build an opaque payload the way the server would serve it.
pub(crate) fn encoded_info(host: &str, name: &str, assets: &[&str]) -> String {
    let pages: Vec<serde_json::Value> = assets
        .iter()
        .map(|u| serde_json::json!({ "u": u }))
        .collect();
    let info = serde_json::json!({
        "gif_host": host,
        "name": name,
        "gif_struct": serde_json::to_string(&pages).unwrap(),
    });
    codec::encode(info.to_string().as_bytes())
}

/// Config pointed at a mock server, with fast retries for test speed.
pub(crate) fn test_config(
    server_uri: &str,
    output_dir: &std::path::Path,
    mode: FailureMode,
) -> Config {
    let mut config = Config::default();
    config.endpoint.base_url = server_uri.to_string();
    config.download.output_dir = output_dir.to_path_buf();
    config.download.failure_mode = mode;
    config.retry.max_attempts = 2;
    config.retry.initial_delay = Duration::from_millis(5);
    config.retry.max_delay = Duration::from_millis(20);
    config
}

/// Downloader with a [`RawConverter`] writing into a fresh temp dir.
pub(crate) fn test_downloader(server_uri: &str, mode: FailureMode) -> (DocDownloader, TempDir) {
    let temp = tempfile::tempdir().unwrap();
    let config = test_config(server_uri, temp.path(), mode);
    let downloader = DocDownloader::with_converter(config, Arc::new(RawConverter)).unwrap();
    (downloader, temp)
}
