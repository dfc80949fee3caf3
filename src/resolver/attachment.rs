//! Chat-platform attachment resolver.
//!
//! Attachments are already concrete image URLs, so resolution is a shape
//! check plus name validation: one candidate, with whatever byte size the
//! platform declared. The fetcher infers the file extension from the
//! response Content-Type when the URL's query-signed path hides it.

use async_trait::async_trait;
use tracing::instrument;

use super::{
    ATTACHMENT_URL_PATTERN, Candidate, EmoteAsset, ResolveError, Resolver, SourceDescriptor,
    resolve_name,
};

/// Resolver for platform attachment URLs.
#[derive(Debug, Default)]
pub struct AttachmentResolver;

impl AttachmentResolver {
    /// Creates a new `AttachmentResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Resolver for AttachmentResolver {
    fn name(&self) -> &'static str {
        "attachment"
    }

    fn can_handle(&self, descriptor: &SourceDescriptor) -> bool {
        matches!(descriptor, SourceDescriptor::Attachment { .. })
    }

    #[instrument(skip(self, descriptor), fields(resolver = "attachment"))]
    async fn resolve(
        &self,
        descriptor: &SourceDescriptor,
        suggested_name: Option<&str>,
    ) -> Result<EmoteAsset, ResolveError> {
        let SourceDescriptor::Attachment { url, declared_size } = descriptor else {
            return Err(ResolveError::invalid_url(descriptor.url()));
        };
        let Some(captures) = ATTACHMENT_URL_PATTERN.captures(url) else {
            return Err(ResolveError::invalid_url(url));
        };

        let animated = &captures[1] == "gif";
        let name = resolve_name(suggested_name, None, url)?;
        let candidate = match declared_size {
            Some(size) => Candidate::with_size(url.clone(), *size),
            None => Candidate::new(url.clone()),
        };

        Ok(EmoteAsset {
            name,
            animated,
            candidates: vec![candidate],
            source_id: None,
        })
    }
}
