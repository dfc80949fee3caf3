//! Direct emote-CDN URL resolver.
//!
//! When the caller pastes a CDN rendition URL directly there is no metadata
//! to consult, so no sizes are declared; the ladder is generated by
//! rewriting the size segment (`4x`, `3x`, `2x`, `1x`) and size-fitting is
//! delegated entirely to the normalizer.

use async_trait::async_trait;
use tracing::instrument;

use super::{
    CDN_URL_PATTERN, Candidate, EmoteAsset, ResolveError, Resolver, SourceDescriptor,
    resolve_name,
};

/// The size ladder served by the CDN, largest first.
const SIZE_LADDER: [u32; 4] = [4, 3, 2, 1];

/// Resolver for direct CDN rendition URLs.
#[derive(Debug, Default)]
pub struct CdnUrlResolver;

impl CdnUrlResolver {
    /// Creates a new `CdnUrlResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Resolver for CdnUrlResolver {
    fn name(&self) -> &'static str {
        "cdn"
    }

    fn can_handle(&self, descriptor: &SourceDescriptor) -> bool {
        matches!(descriptor, SourceDescriptor::CdnUrl(_))
    }

    #[instrument(skip(self, descriptor), fields(resolver = "cdn"))]
    async fn resolve(
        &self,
        descriptor: &SourceDescriptor,
        suggested_name: Option<&str>,
    ) -> Result<EmoteAsset, ResolveError> {
        let SourceDescriptor::CdnUrl(url) = descriptor else {
            return Err(ResolveError::invalid_url(descriptor.url()));
        };
        let Some(captures) = CDN_URL_PATTERN.captures(url) else {
            return Err(ResolveError::invalid_url(url));
        };

        // The CDN declares no per-variant sizes; the URL alone carries an
        // animation hint only when it names a gif rendition.
        let id = captures[1].to_string();
        let extension = captures[3].to_string();
        let animated = extension == "gif";
        let name = resolve_name(suggested_name, None, url)?;

        let candidates = SIZE_LADDER
            .iter()
            .map(|size| {
                let rewritten = CDN_URL_PATTERN
                    .replace(url, format!("//cdn.7tv.app/emote/{id}/{size}x.{extension}"))
                    .into_owned();
                Candidate::new(normalize_scheme(&rewritten))
            })
            .collect();

        Ok(EmoteAsset {
            name,
            animated,
            candidates,
            source_id: Some(id),
        })
    }
}

/// Promotes scheme-relative CDN URLs to https.
fn normalize_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cdn_resolver_builds_descending_ladder() {
        let resolver = CdnUrlResolver::new();
        let descriptor =
            SourceDescriptor::CdnUrl("https://cdn.7tv.app/emote/abc123/2x.webp".to_string());
        let asset = resolver.resolve(&descriptor, Some("myEmote")).await.unwrap();

        let urls: Vec<&str> = asset.candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.7tv.app/emote/abc123/4x.webp",
                "https://cdn.7tv.app/emote/abc123/3x.webp",
                "https://cdn.7tv.app/emote/abc123/2x.webp",
                "https://cdn.7tv.app/emote/abc123/1x.webp",
            ]
        );
        assert_eq!(asset.source_id.as_deref(), Some("abc123"));
        assert!(!asset.animated);
    }

    #[tokio::test]
    async fn test_cdn_resolver_gif_rendition_is_animated_hint() {
        let resolver = CdnUrlResolver::new();
        let descriptor =
            SourceDescriptor::CdnUrl("https://cdn.7tv.app/emote/abc123/1x.gif".to_string());
        let asset = resolver.resolve(&descriptor, Some("myEmote")).await.unwrap();
        assert!(asset.animated);
    }

    #[tokio::test]
    async fn test_cdn_resolver_requires_suggested_name() {
        let resolver = CdnUrlResolver::new();
        let descriptor =
            SourceDescriptor::CdnUrl("https://cdn.7tv.app/emote/abc123/4x.webp".to_string());
        let err = resolver.resolve(&descriptor, None).await.unwrap_err();
        assert!(matches!(err, ResolveError::MissingName { .. }));
    }

    #[tokio::test]
    async fn test_cdn_resolver_rejects_off_pattern_url() {
        let resolver = CdnUrlResolver::new();
        let descriptor = SourceDescriptor::CdnUrl("https://cdn.7tv.app/other/abc".to_string());
        let err = resolver.resolve(&descriptor, Some("myEmote")).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidUrl { .. }));
    }
}
