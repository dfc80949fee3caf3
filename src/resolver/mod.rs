//! Source resolution: turning an untrusted descriptor into candidate URLs.
//!
//! This module classifies raw user input into a [`SourceDescriptor`],
//! validates the requested emote name, and resolves the descriptor through
//! a registry of per-source resolvers into an [`EmoteAsset`] carrying an
//! ordered (largest-to-smallest) list of candidate download URLs.
//!
//! # Architecture
//!
//! - [`Resolver`] - Async trait that individual source resolvers implement
//! - [`SourceRegistry`] - Ordered collection of resolvers with first-match dispatch
//! - [`SevenTvResolver`] - Metadata-API-backed resolution for 7TV emote ids
//! - [`CdnUrlResolver`] - Direct emote-CDN URLs with the 4x/3x/2x/1x size ladder
//! - [`AttachmentResolver`] - Chat-platform attachments (single candidate)

mod attachment;
mod cdn;
mod error;
mod seventv;

pub use attachment::AttachmentResolver;
pub use cdn::CdnUrlResolver;
pub use error::ResolveError;
pub use seventv::SevenTvResolver;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

/// Emote page URL shape accepted for API-backed resolution, e.g.
/// `https://7tv.app/emotes/6042089e77137b000de9e669`.
#[allow(clippy::expect_used)]
static EMOTE_PAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://7tv\.app/emotes/(\w+)$").expect("emote page regex is valid")
    // Static pattern, safe to panic
});

/// Emote CDN URL shape, e.g. `https://cdn.7tv.app/emote/<id>/4x.webp`.
/// Captures the emote id, the size rung, and the extension; shared with
/// [`CdnUrlResolver`] so classification and resolution cannot drift.
#[allow(clippy::expect_used)]
static CDN_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?:)?//cdn\.7tv\.app/emote/(\w+)/(\d)x\.(webp|gif|png|avif)$")
        .expect("CDN URL regex is valid") // Static pattern, safe to panic
});

/// Chat-platform attachment URL shape (channel id / filename with an image
/// extension, optionally followed by signing query parameters). Shared with
/// [`AttachmentResolver`].
#[allow(clippy::expect_used)]
static ATTACHMENT_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\d+/[^/?]+\.(png|gif|webp|jpg|jpeg)(\?|$)")
        .expect("attachment URL regex is valid") // Static pattern, safe to panic
});

/// One untrusted emote source, constructed once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// An emote known to the metadata API by id, plus the page URL it came from.
    EmoteId {
        /// Opaque emote id.
        id: String,
        /// The page URL the id was extracted from.
        origin_url: String,
    },
    /// A direct emote-CDN URL.
    CdnUrl(String),
    /// A chat-platform attachment with its declared byte size, when known.
    Attachment {
        /// Attachment download URL.
        url: String,
        /// Byte size declared by the platform, if available.
        declared_size: Option<u64>,
    },
}

impl SourceDescriptor {
    /// Classifies a raw input string into a descriptor.
    ///
    /// Emote page URLs become [`SourceDescriptor::EmoteId`], CDN URLs become
    /// [`SourceDescriptor::CdnUrl`], and anything matching the attachment
    /// shape becomes [`SourceDescriptor::Attachment`] with no declared size
    /// (the platform layer fills the size in when it has one).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidUrl`] when the input matches none of
    /// the accepted URL shapes.
    pub fn classify(input: &str) -> Result<Self, ResolveError> {
        let input = input.trim();
        if let Some(captures) = EMOTE_PAGE_PATTERN.captures(input) {
            return Ok(Self::EmoteId {
                id: captures[1].to_string(),
                origin_url: input.to_string(),
            });
        }
        if CDN_URL_PATTERN.is_match(input) {
            return Ok(Self::CdnUrl(input.to_string()));
        }
        if input.starts_with("http") && ATTACHMENT_URL_PATTERN.is_match(input) {
            return Ok(Self::Attachment {
                url: input.to_string(),
                declared_size: None,
            });
        }
        Err(ResolveError::invalid_url(input))
    }

    /// The URL this descriptor was built from, for diagnostics.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::EmoteId { origin_url, .. } => origin_url,
            Self::CdnUrl(url) | Self::Attachment { url, .. } => url,
        }
    }
}

/// One downloadable rendition of the emote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Download URL for this variant.
    pub url: String,
    /// Byte size declared by the source's metadata, when known.
    pub declared_size: Option<u64>,
}

impl Candidate {
    /// Creates a candidate with no declared size.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            declared_size: None,
        }
    }

    /// Creates a candidate with a declared size.
    #[must_use]
    pub fn with_size(url: impl Into<String>, size: u64) -> Self {
        Self {
            url: url.into(),
            declared_size: Some(size),
        }
    }
}

/// A resolved emote ready for the fetch/normalize/upload loop.
///
/// `candidates` is ordered largest-to-smallest and is non-empty whenever
/// resolution succeeds; the retry loop walks it front to back.
#[derive(Debug, Clone)]
pub struct EmoteAsset {
    /// Validated emote name (2-32 chars, alphanumeric or underscore).
    pub name: String,
    /// Whether the source declares the emote as animated.
    pub animated: bool,
    /// Candidate download URLs, largest expected size first.
    pub candidates: Vec<Candidate>,
    /// Opaque provenance id, when the source has one.
    pub source_id: Option<String>,
}

/// Checks the one cross-cutting name invariant: 2-32 characters, each an
/// alphanumeric (unicode letters and digits count) or an underscore.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (2..=32).contains(&len) && name.chars().all(|c| c == '_' || c.is_alphanumeric())
}

/// Resolves the emote name with explicit-suggestion precedence and
/// validates it before any network call is made.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidName`] when the winning name fails the
/// 2-32 alphanumeric-or-underscore check.
pub fn resolve_name(
    suggested: Option<&str>,
    declared: Option<&str>,
    source_url: &str,
) -> Result<String, ResolveError> {
    let name = match suggested.or(declared) {
        Some(name) => name,
        None => return Err(ResolveError::missing_name(source_url)),
    };
    if !is_valid_name(name) {
        return Err(ResolveError::invalid_name(name));
    }
    Ok(name.to_string())
}

/// Trait that all source resolvers implement.
///
/// Resolvers turn a [`SourceDescriptor`] into an [`EmoteAsset`] with an
/// ordered candidate list. Each resolver declares which descriptors it
/// handles; the registry dispatches to the first match.
///
/// # Object Safety
///
/// Uses `async_trait` to support dynamic dispatch via `Box<dyn Resolver>`.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the resolver's name (e.g. "7tv", "cdn", "attachment").
    fn name(&self) -> &str;

    /// Returns true if this resolver can handle the given descriptor.
    fn can_handle(&self, descriptor: &SourceDescriptor) -> bool;

    /// Attempts to resolve the descriptor into an emote asset.
    async fn resolve(
        &self,
        descriptor: &SourceDescriptor,
        suggested_name: Option<&str>,
    ) -> Result<EmoteAsset, ResolveError>;
}

/// An ordered collection of resolvers with first-match dispatch.
pub struct SourceRegistry {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Registers a resolver. Registration order is dispatch order.
    pub fn register(&mut self, resolver: Box<dyn Resolver>) {
        debug!(name = resolver.name(), "Registering resolver");
        self.resolvers.push(resolver);
    }

    /// Returns the number of registered resolvers.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    /// Resolves a descriptor through the first resolver that accepts it.
    ///
    /// A suggested name is validated up front so that an invalid name fails
    /// before any metadata network call.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidName`] on a bad suggested name,
    /// [`ResolveError::NoResolver`] when nothing accepts the descriptor, or
    /// whatever the dispatched resolver fails with.
    #[tracing::instrument(skip(self), fields(source = descriptor.url()))]
    pub async fn resolve(
        &self,
        descriptor: &SourceDescriptor,
        suggested_name: Option<&str>,
    ) -> Result<EmoteAsset, ResolveError> {
        // Fail fast on a bad explicit name, before touching the network.
        if let Some(name) = suggested_name {
            if !is_valid_name(name) {
                return Err(ResolveError::invalid_name(name));
            }
        }

        for resolver in &self.resolvers {
            if resolver.can_handle(descriptor) {
                debug!(resolver = resolver.name(), "Dispatching to resolver");
                return resolver.resolve(descriptor, suggested_name).await;
            }
        }
        Err(ResolveError::NoResolver)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the default registry used by the CLI: 7TV metadata lookup, then
/// direct CDN URLs, then attachments.
#[must_use]
pub fn build_default_registry(seventv_api_base: &str) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    registry.register(Box::new(SevenTvResolver::new(seventv_api_base)));
    registry.register(Box::new(CdnUrlResolver::new()));
    registry.register(Box::new(AttachmentResolver::new()));
    registry
}
