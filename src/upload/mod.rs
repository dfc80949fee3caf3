//! Upload driver: the remote create-resource call and its error taxonomy.
//!
//! # Architecture
//!
//! - [`EmoteUploader`] - Trait the retry loop drives; object-safe so tests
//!   can substitute scripted implementations
//! - [`DiscordUploader`] - HTTP implementation against the guild emoji API
//! - [`UploadOutcome`] - The outcome taxonomy the loop acts on
//! - [`decode_error_code`] / [`classify_rejection`] - Remote error decoding,
//!   isolated and unit-testable without any network dependency

mod discord;
mod outcome;

pub use discord::DiscordUploader;
pub use outcome::{
    CODE_FORMAT_REJECTED, CODE_NAME_REJECTED, CODE_PAYLOAD_TOO_LARGE, CODE_QUOTA_EXCEEDED,
    UploadOutcome, classify_rejection, decode_error_code,
};

use std::path::Path;

use async_trait::async_trait;

/// Trait for submitting a named emote asset to the target collection.
///
/// Implementations return an [`UploadOutcome`] rather than a `Result`:
/// non-success outcomes are data the retry loop classifies, not errors to
/// propagate.
#[async_trait]
pub trait EmoteUploader: Send + Sync {
    /// Submits the file at `image_path` under `name`.
    async fn upload(&self, name: &str, image_path: &Path) -> UploadOutcome;
}
