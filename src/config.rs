//! Configuration types for doc88-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for [`DocDownloader`](crate::DocDownloader)
///
/// Every field has a sensible default; `Config::default()` talks to the
/// public doc88 endpoint, downloads into `./downloads`, and fails fast on the
/// first broken page. The configuration is immutable once a downloader is
/// built from it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote endpoint settings (metadata service, request headers)
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Download behavior settings (output directory, failure policy, pacing)
    #[serde(default)]
    pub download: DownloadConfig,

    /// Retry policy for page downloads
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Remote endpoint configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the metadata service (default: "https://m.doc88.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static access key sent with every metadata request
    #[serde(default = "default_access_key")]
    pub access_key: String,

    /// User-Agent header; the host only serves page data to mobile browsers
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer header (default: the base URL)
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Per-request timeout (default: 15 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_key: default_access_key(),
            user_agent: default_user_agent(),
            referer: default_referer(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Download behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory that receives one sub-directory per document (default: "./downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Partial-failure policy (default: fail fast)
    #[serde(default)]
    pub failure_mode: FailureMode,

    /// Optional randomized delay before every page request
    ///
    /// A rate-limiting courtesy to the remote host, not a correctness
    /// requirement; disabled by default.
    #[serde(default)]
    pub courtesy_delay: Option<CourtesyDelay>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            failure_mode: FailureMode::default(),
            courtesy_delay: None,
        }
    }
}

/// Partial-failure policy for page downloads
///
/// Governs what one broken page does to the whole document. Callers choose
/// the mode explicitly; the two behaviors are too different to guess.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Abort the document on the first page failure; no artifact is written.
    /// Page files already on disk are left in place. (default)
    #[default]
    FailFast,

    /// Log the failure, leave that page out, and continue. The artifact
    /// silently omits failed pages; callers needing a complete document must
    /// treat any failure count above zero as fatal.
    BestEffort,
}

/// Uniformly random inter-request delay range
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CourtesyDelay {
    /// Minimum delay
    #[serde(with = "duration_serde")]
    pub min: Duration,

    /// Maximum delay (must be >= `min`)
    #[serde(with = "duration_serde")]
    pub max: Duration,
}

/// Retry policy for page downloads
///
/// An immutable value handed to the page fetch loop; there is no ambient or
/// mutable retry state anywhere else.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per page, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Cap on the delay between attempts (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each failed attempt (default: 2.0)
    ///
    /// Set to 1.0 for a fixed delay between attempts.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to retry delays (default: false)
    #[serde(default)]
    pub jitter: bool,

    /// HTTP status codes that warrant a retry (default: 429, 500, 502, 503, 504)
    ///
    /// Any other non-success status fails the page immediately.
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
            retry_statuses: default_retry_statuses(),
        }
    }
}

fn default_base_url() -> String {
    "https://m.doc88.com".to_string()
}

fn default_access_key() -> String {
    "3854933de90d1dbb321d8ca29eac130a".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Linux; Android 10; Pixel 3) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/89.0.4389.82 Mobile Safari/537.36"
        .to_string()
}

fn default_referer() -> String {
    "https://m.doc88.com/".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

// Duration serialization helper (Durations serialize as whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_public_endpoint() {
        let config = Config::default();
        assert_eq!(config.endpoint.base_url, "https://m.doc88.com");
        assert_eq!(config.endpoint.access_key.len(), 32);
        assert_eq!(config.download.failure_mode, FailureMode::FailFast);
        assert!(config.download.courtesy_delay.is_none());
    }

    #[test]
    fn default_retry_policy_matches_documented_values() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay, Duration::from_secs(2));
        assert_eq!(retry.retry_statuses, vec![429, 500, 502, 503, 504]);
        assert!(!retry.jitter);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.endpoint.base_url, Config::default().endpoint.base_url);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn failure_mode_uses_snake_case_names() {
        let config: Config =
            serde_json::from_str(r#"{"download": {"failure_mode": "best_effort"}}"#).unwrap();
        assert_eq!(config.download.failure_mode, FailureMode::BestEffort);
    }

    #[test]
    fn durations_round_trip_as_seconds() {
        let mut config = Config::default();
        config.retry.initial_delay = Duration::from_secs(7);
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.retry.initial_delay, Duration::from_secs(7));
    }

    #[test]
    fn courtesy_delay_round_trips() {
        let mut config = Config::default();
        config.download.courtesy_delay = Some(CourtesyDelay {
            min: Duration::from_secs(1),
            max: Duration::from_secs(5),
        });
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        let delay = back.download.courtesy_delay.unwrap();
        assert_eq!(delay.min, Duration::from_secs(1));
        assert_eq!(delay.max, Duration::from_secs(5));
    }
}
