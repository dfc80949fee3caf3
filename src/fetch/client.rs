//! HTTP client wrapper for fetching candidate assets.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use crate::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

use super::error::FetchError;
use super::{FetchedImage, extension_from_content_type, extension_from_url};

/// Extension used when neither the URL nor the Content-Type identifies the
/// body; the normalizer sniffs the actual container from the bytes.
const FALLBACK_EXTENSION: &str = "img";

/// HTTP client for retrieving candidate URLs into a working file.
///
/// Created once per pipeline and reused across candidate attempts to take
/// advantage of connection pooling. Cloning is cheap (shared pool).
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Creates a new client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeout
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches one candidate URL into `<dest_stem>.<ext>`.
    ///
    /// The extension comes from the URL path when it names a known image
    /// container, otherwise from the response Content-Type; failing both,
    /// a neutral fallback is used and the normalizer sniffs the bytes.
    /// Any prior content at the destination from an earlier attempt in the
    /// same request is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Unreachable`] on a non-2xx response,
    /// [`FetchError::Timeout`] / [`FetchError::Network`] on transport
    /// failures, and [`FetchError::Io`] when the body cannot be written.
    #[instrument(skip(self, dest_stem))]
    pub async fn fetch(&self, url: &str, dest_stem: &Path) -> Result<FetchedImage, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::unreachable(url, status.as_u16()));
        }

        let content_type_ext = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extension_from_content_type);
        let extension = extension_from_url(url)
            .or(content_type_ext)
            .unwrap_or(FALLBACK_EXTENSION);
        let path = dest_stem.with_extension(extension);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| FetchError::io(&path, e))?;

        let byte_size = bytes.len() as u64;
        debug!(path = %path.display(), byte_size, "Fetched candidate");
        Ok(FetchedImage { path, byte_size })
    }
}
