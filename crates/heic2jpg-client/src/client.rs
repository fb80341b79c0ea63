//! HTTP client for the remote conversion service.
//!
//! One call is one round trip: no retries, no chunking. Responses map onto
//! [`ClientError`] as follows:
//! - non-success status: [`ClientError::Conversion`] with the service's `detail`
//! - no response: [`ClientError::Network`]
//! - request could not be built: [`ClientError::Request`]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bytes::Bytes;
use heic2jpg_types::{filter_options, ConversionOptions, ConversionResult, ErrorResponse, HealthResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, GENERIC_CONVERSION_ERROR};
use crate::input::SelectedFile;

pub const CONVERT_PATH: &str = "/api/v1/convert";
pub const HEALTH_PATH: &str = "/api/health";

const GENERIC_DOWNLOAD_ERROR: &str = "Error downloading image";
const GENERIC_HEALTH_ERROR: &str = "Health check failed";

/// Builder for [`ConversionClient`].
///
/// # Example
/// ```rust,no_run
/// # async fn run() -> Result<(), heic2jpg_client::ClientError> {
/// use heic2jpg_client::ConversionClient;
/// let client = ConversionClient::builder()
///     .base_url("http://localhost:8000")
///     .timeout(std::time::Duration::from_secs(60))
///     .build()?;
/// let health = client.health().await?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Set the service root (default: `"http://localhost:8000"`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set a whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Override the HTTP/HTTPS proxy URL.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy.into());
        self
    }

    pub fn build(mut self) -> Result<ConversionClient, ClientError> {
        let base = Url::parse(self.config.base_url.trim()).map_err(|e| {
            ClientError::Request(format!("invalid base URL {:?}: {e}", self.config.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::Request(format!(
                "unsupported URL scheme {:?} in base URL",
                base.scheme()
            )));
        }
        self.config.base_url = base.as_str().trim_end_matches('/').to_owned();

        let mut builder =
            Client::builder().user_agent(concat!("heic2jpg/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        match self.config.proxy.as_deref() {
            Some(proxy_url) => match reqwest::Proxy::all(proxy_url) {
                Ok(p) => builder = builder.proxy(p),
                Err(e) => {
                    warn!(proxy = %proxy_url, error = %e, "ignoring invalid proxy URL");
                }
            },
            None => builder = builder.no_proxy(),
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Request(e.to_string()))?;

        Ok(ConversionClient {
            http,
            config: self.config,
        })
    }
}

/// Client for the conversion service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: Client,
    config: ClientConfig,
}

impl ConversionClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Build a client from `HEIC2JPG_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        ClientBuilder::from_config(ClientConfig::from_env()).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Normalised service root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Resolve a server-relative path against the base URL. Absolute
    /// `http(s)` URLs are returned unchanged.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// Upload `file` with `options` and return the service's result descriptor.
    pub async fn convert(
        &self,
        file: &SelectedFile,
        options: &ConversionOptions,
    ) -> Result<ConversionResult, ClientError> {
        options.validate()?;
        self.convert_fields(file, options.to_raw()).await
    }

    /// Upload `file` with an untyped option map. Missing and blank values are
    /// dropped before the request is built.
    pub async fn convert_fields<I, K, V>(
        &self,
        file: &SelectedFile,
        raw_options: I,
    ) -> Result<ConversionResult, ClientError>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let fields = filter_options(raw_options);
        let url = self.resolve_url(CONVERT_PATH);

        let part = Part::stream_with_length(file.bytes().clone(), file.size())
            .file_name(file.name().to_owned())
            .mime_str(file.mime())
            .map_err(|e| ClientError::Request(e.to_string()))?;
        let mut form = Form::new().part("file", part);
        for (name, value) in &fields {
            form = form.text(name.clone(), value.clone());
        }

        debug!(
            url = %url,
            file = %file.name(),
            size = file.size(),
            fields = ?fields,
            "sending conversion request"
        );

        let started = Instant::now();
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejection(resp, GENERIC_CONVERSION_ERROR).await);
        }

        let body = resp.bytes().await.map_err(ClientError::Network)?;
        let result: ConversionResult = serde_json::from_slice(&body).map_err(|e| {
            warn!(status = status.as_u16(), error = %e, "unreadable conversion response");
            ClientError::Conversion {
                status: status.as_u16(),
                message: GENERIC_CONVERSION_ERROR.to_owned(),
            }
        })?;

        info!(
            file = %file.name(),
            original_size = result.original_size,
            converted_size = result.converted_size,
            conversion_time = result.conversion_time,
            latency_ms = started.elapsed().as_millis() as u64,
            "conversion done"
        );

        Ok(result)
    }

    /// Fetch a converted artifact (`GET {base}{download_url}`).
    pub async fn download(&self, download_url: &str) -> Result<Bytes, ClientError> {
        let url = self.resolve_url(download_url);
        debug!(url = %url, "downloading artifact");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        if !resp.status().is_success() {
            return Err(rejection(resp, GENERIC_DOWNLOAD_ERROR).await);
        }

        resp.bytes().await.map_err(ClientError::Network)
    }

    /// Fetch a converted artifact and save it as `dir/filename`.
    ///
    /// Only the final component of `filename` is used, so a server-supplied
    /// name cannot escape `dir`.
    pub async fn download_to(
        &self,
        download_url: &str,
        dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, ClientError> {
        let name = Path::new(filename)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ClientError::Validation(format!("Invalid file name: {filename:?}")))?;

        let bytes = self.download(download_url).await?;

        tokio::fs::create_dir_all(dir).await?;
        let dest = dir.join(name);
        tokio::fs::write(&dest, &bytes).await?;

        info!(path = %dest.display(), bytes = bytes.len(), "artifact saved");
        Ok(dest)
    }

    /// Query `GET {base}/api/health`.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.resolve_url(HEALTH_PATH);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejection(resp, GENERIC_HEALTH_ERROR).await);
        }

        let body = resp.bytes().await.map_err(ClientError::Network)?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "unreadable health response");
            ClientError::Conversion {
                status: status.as_u16(),
                message: GENERIC_HEALTH_ERROR.to_owned(),
            }
        })
    }
}

/// Turn a non-success response into [`ClientError::Conversion`], preferring
/// the service's `detail` over `fallback`.
async fn rejection(resp: Response, fallback: &str) -> ClientError {
    let status = resp.status().as_u16();
    let detail = match resp.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message()),
        Err(e) => {
            debug!(error = %e, "failed to read error body");
            None
        }
    };

    let message = detail.unwrap_or_else(|| fallback.to_owned());
    warn!(status, message = %message, "request rejected by service");
    ClientError::Conversion { status, message }
}
