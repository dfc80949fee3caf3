//! 7TV metadata-API resolver.
//!
//! Looks up an emote id against the 7TV v3 API and builds the candidate
//! ladder from the declared `WEBP` variant files: every variant already
//! under the byte ceiling, largest first, with the smallest variant always
//! kept as the last resort (the normalizer shrinks it if it is still too
//! big).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::constants::{CONNECT_TIMEOUT_SECS, MAX_EMOTE_BYTES, READ_TIMEOUT_SECS};

use super::{Candidate, EmoteAsset, ResolveError, Resolver, SourceDescriptor, resolve_name};

/// Accepted transport container for declared variants.
const ACCEPTED_CONTAINER: &str = "WEBP";

/// Emote metadata returned by `GET <base>/<id>`.
#[derive(Debug, Deserialize)]
struct EmoteMetadata {
    id: String,
    name: String,
    animated: bool,
    host: HostMetadata,
}

#[derive(Debug, Deserialize)]
struct HostMetadata {
    url: String,
    files: Vec<VariantFile>,
}

/// One declared variant file, e.g. `{"name": "4x.webp", "format": "WEBP", "size": 183000}`.
#[derive(Debug, Deserialize)]
struct VariantFile {
    name: String,
    format: String,
    size: u64,
}

/// Resolver for API-backed emote ids.
pub struct SevenTvResolver {
    client: Client,
    api_base: String,
    size_ceiling: u64,
}

impl SevenTvResolver {
    /// Creates a resolver against the given metadata API base URL.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static timeout
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            size_ceiling: MAX_EMOTE_BYTES,
        }
    }

    /// Overrides the byte ceiling used for variant filtering (tests).
    #[must_use]
    pub fn with_size_ceiling(mut self, ceiling: u64) -> Self {
        self.size_ceiling = ceiling;
        self
    }

    /// Builds the largest-to-smallest candidate list from declared variants.
    ///
    /// Only `WEBP` container files count. Files within the ceiling are kept;
    /// the smallest file is always retained even when over the ceiling so
    /// the loop has a last resort to hand to the normalizer. Download URLs
    /// swap the container extension for the target encoding (`gif` for
    /// animated, `png` for static), matching what the CDN serves alongside
    /// each WEBP rendition.
    fn build_candidates(&self, metadata: &EmoteMetadata) -> Result<Vec<Candidate>, ResolveError> {
        let mut variants: Vec<&VariantFile> = metadata
            .host
            .files
            .iter()
            .filter(|file| file.format == ACCEPTED_CONTAINER)
            .collect();
        if variants.is_empty() {
            return Err(ResolveError::no_suitable_variant(&metadata.id));
        }
        variants.sort_by(|a, b| b.size.cmp(&a.size));

        let target_ext = if metadata.animated { "gif" } else { "png" };
        let last_index = variants.len() - 1;
        let candidates: Vec<Candidate> = variants
            .iter()
            .enumerate()
            .filter(|(index, file)| file.size <= self.size_ceiling || *index == last_index)
            .map(|(_, file)| {
                let file_name = swap_extension(&file.name, target_ext);
                let url = join_host_url(&metadata.host.url, &file_name);
                Candidate::with_size(url, file.size)
            })
            .collect();
        Ok(candidates)
    }
}

#[async_trait]
impl Resolver for SevenTvResolver {
    fn name(&self) -> &'static str {
        "7tv"
    }

    fn can_handle(&self, descriptor: &SourceDescriptor) -> bool {
        matches!(descriptor, SourceDescriptor::EmoteId { .. })
    }

    #[instrument(skip(self, descriptor), fields(resolver = "7tv"))]
    async fn resolve(
        &self,
        descriptor: &SourceDescriptor,
        suggested_name: Option<&str>,
    ) -> Result<EmoteAsset, ResolveError> {
        let SourceDescriptor::EmoteId { id, origin_url } = descriptor else {
            return Err(ResolveError::invalid_url(descriptor.url()));
        };

        let metadata_url = format!("{}/{id}", self.api_base);
        let response = self
            .client
            .get(&metadata_url)
            .send()
            .await
            .map_err(|e| ResolveError::network(&metadata_url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::not_found(id, status.as_u16()));
        }
        let metadata: EmoteMetadata = response
            .json()
            .await
            .map_err(|e| ResolveError::network(&metadata_url, e))?;

        let name = resolve_name(suggested_name, Some(&metadata.name), origin_url)?;
        let candidates = self.build_candidates(&metadata)?;
        debug!(
            id = %metadata.id,
            name = %name,
            animated = metadata.animated,
            candidate_count = candidates.len(),
            "Resolved emote metadata"
        );

        Ok(EmoteAsset {
            name,
            animated: metadata.animated,
            candidates,
            source_id: Some(metadata.id.clone()),
        })
    }
}

/// Swaps a variant file name's extension, e.g. `4x.webp` -> `4x.gif`.
fn swap_extension(file_name: &str, target_ext: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.{target_ext}"),
        None => format!("{file_name}.{target_ext}"),
    }
}

/// Joins a host URL and file name, promoting scheme-relative `//cdn...`
/// hosts to https.
fn join_host_url(host_url: &str, file_name: &str) -> String {
    let base = host_url.trim_end_matches('/');
    let url = format!("{base}/{file_name}");
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url
    }
}
