//! Asset fetching: one GET per candidate into the request's working file.
//!
//! The fetcher does not inspect image structure (that is the normalizer's
//! job); it validates transport success, picks a file extension from the
//! URL path or the response Content-Type, writes the body, and reports the
//! true on-disk size.

mod client;
mod error;

pub use client::FetchClient;
pub use error::FetchError;

use std::path::PathBuf;

use url::Url;

/// The local working copy of one fetched candidate.
///
/// The path is owned exclusively by the request's pipeline; the normalizer
/// overwrites it in place and the workspace deletes it on every exit path.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Working-file location.
    pub path: PathBuf,
    /// Measured size of the body written to disk.
    pub byte_size: u64,
}

/// Maps an image Content-Type to a file extension.
///
/// Used for attachment URLs whose signed paths carry no reliable extension.
#[must_use]
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    // Strip parameters such as "; charset=..."
    let essence = content_type.split(';').next().unwrap_or("").trim();
    match essence {
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/jpeg" => Some("jpg"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Extracts a known image extension from a URL path, ignoring any query or
/// fragment.
#[must_use]
pub fn extension_from_url(url: &str) -> Option<&'static str> {
    let parsed = Url::parse(url).ok()?;
    let (_, ext) = parsed.path().rsplit_once('.')?;
    match ext {
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "jpg" => Some("jpg"),
        "jpeg" => Some("jpeg"),
        "avif" => Some("avif"),
        _ => None,
    }
}
