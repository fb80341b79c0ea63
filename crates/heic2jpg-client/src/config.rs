//! Client configuration, loaded from environment variables.

use std::time::Duration;

/// Base URL used when `HEIC2JPG_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Upload cap used when `HEIC2JPG_MAX_UPLOAD_MB` is not set. Matches the
/// service's own limit so oversized files fail before the upload starts.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

/// Runtime configuration for [`crate::ConversionClient`].
///
/// Every field has a default so the client works against a local service
/// without any environment variables set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Service root, without a trailing slash (default: `"http://localhost:8000"`).
    pub base_url: String,

    /// Whole-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,

    /// Largest file accepted at selection time, in bytes.
    pub max_upload_bytes: u64,

    /// HTTP/HTTPS proxy URL.
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            proxy: None,
        }
    }
}

impl ClientConfig {
    /// Build [`ClientConfig`] from environment variables, falling back to defaults.
    ///
    /// Proxy is read from `HTTP_PROXY` / `HTTPS_PROXY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`ClientConfig`] from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = parse_var::<u64, _>(&lookup, "HEIC2JPG_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let max_upload_mb =
            parse_var(&lookup, "HEIC2JPG_MAX_UPLOAD_MB").unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Self {
            base_url: lookup("HEIC2JPG_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout,
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            proxy: lookup("HTTP_PROXY").or_else(|| lookup("HTTPS_PROXY")),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
