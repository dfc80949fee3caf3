//! HTTP upload driver for the guild emote create-resource call.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde_json::json;
use tracing::{error, instrument, warn};

use crate::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

use super::outcome::{UploadOutcome, classify_rejection};
use super::EmoteUploader;

/// Uploads emotes to a guild collection over the Discord-style HTTP API.
///
/// The create call is `POST <api_base>/guilds/<guild_id>/emojis` with a
/// JSON body of `{name, image}` where `image` is a base64 data URI. The
/// image content type is sniffed from the file bytes, so the driver works
/// for both of the platform's accepted encodings without being told which
/// one the normalizer produced.
pub struct DiscordUploader {
    client: Client,
    api_base: String,
    guild_id: String,
    token: String,
}

impl DiscordUploader {
    /// Creates an uploader for one guild collection.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static timeout
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(
        api_base: impl Into<String>,
        guild_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            guild_id: guild_id.into(),
            token: token.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/guilds/{}/emojis", self.api_base, self.guild_id)
    }
}

#[async_trait]
impl EmoteUploader for DiscordUploader {
    #[instrument(skip(self, image_path), fields(guild_id = %self.guild_id))]
    async fn upload(&self, name: &str, image_path: &Path) -> UploadOutcome {
        let bytes = match std::fs::read(image_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %image_path.display(), error = %e, "Failed to read working file");
                return UploadOutcome::TransportError(format!(
                    "failed to read {}: {e}",
                    image_path.display()
                ));
            }
        };

        let content_type = match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Gif) => "image/gif",
            _ => "image/png",
        };
        let payload = json!({
            "name": name,
            "image": format!("data:{content_type};base64,{}", BASE64.encode(&bytes)),
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bot {}", self.token))
            .json(&payload)
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Create-emoji call failed at transport level");
                return UploadOutcome::TransportError(e.to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            return UploadOutcome::Success;
        }

        let body = response.text().await.unwrap_or_default();
        let outcome = classify_rejection(status.as_u16(), &body);
        // Audit record for every non-success outcome.
        warn!(
            status = status.as_u16(),
            outcome = ?outcome,
            body = %body,
            name,
            "Create-emoji call rejected"
        );
        outcome
    }
}
