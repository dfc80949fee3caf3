//! Error types for source resolution.

use thiserror::Error;

/// Errors that can occur while resolving a source descriptor into an
/// [`EmoteAsset`](super::EmoteAsset).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The URL does not match the expected host/path shape for its source.
    #[error("invalid source URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// The emote name failed the 2-32 alphanumeric-or-underscore check.
    #[error(
        "invalid emote name '{name}': must be 2-32 characters, letters, digits or underscores only"
    )]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The source carries no name and the caller did not suggest one.
    #[error("no emote name available for {url}: pass a name for this source")]
    MissingName {
        /// The source URL lacking a provider-declared name.
        url: String,
    },

    /// The metadata API returned a non-success status for this id.
    #[error("emote {id} not found (HTTP {status})")]
    NotFound {
        /// The emote id that was looked up.
        id: String,
        /// The HTTP status the metadata API returned.
        status: u16,
    },

    /// No declared variant matches the accepted transport container.
    #[error("emote {id} has no suitable variant in an accepted container")]
    NoSuitableVariant {
        /// The emote id whose variants were all rejected.
        id: String,
    },

    /// Network-level failure talking to the metadata API.
    #[error("network error resolving {url}: {source}")]
    Network {
        /// The metadata URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// No registered resolver accepts this descriptor.
    #[error("no resolver can handle this source")]
    NoResolver,
}

impl ResolveError {
    /// Creates an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid-name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Creates a missing-name error.
    pub fn missing_name(url: impl Into<String>) -> Self {
        Self::MissingName { url: url.into() }
    }

    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>, status: u16) -> Self {
        Self::NotFound {
            id: id.into(),
            status,
        }
    }

    /// Creates a no-suitable-variant error.
    pub fn no_suitable_variant(id: impl Into<String>) -> Self {
        Self::NoSuitableVariant { id: id.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// True for failures that are caught by validation before any network
    /// call (reported to the user as a warning, not an error).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. } | Self::InvalidName { .. } | Self::MissingName { .. }
        )
    }
}
