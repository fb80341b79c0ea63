//! Process configuration, loaded from environment variables at startup.

use heic2jpg_client::ClientConfig;

/// Runtime configuration for the heic2jpg binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Conversion client settings (`HEIC2JPG_BASE_URL`, ...).
    pub client: ClientConfig,

    /// `tracing` filter string, e.g. `"info"` or `"debug,reqwest=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl AppConfig {
    /// Build [`AppConfig`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            log_level: std::env::var("HEIC2JPG_LOG").unwrap_or_else(|_| "info".to_owned()),
            log_json: std::env::var("HEIC2JPG_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
