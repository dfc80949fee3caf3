//! Mote Core Library
//!
//! This library implements the emote acquisition pipeline: it resolves an
//! untrusted source (a 7TV emote id, a raw emote-CDN URL, or a chat
//! attachment) into candidate download URLs, fetches and normalizes the
//! image to the platform's accepted formats and size ceiling, and uploads
//! it to a guild emote collection with size-aware retries.
//!
//! # Architecture
//!
//! - [`resolver`] - Source descriptors, name validation, candidate URL resolution
//! - [`fetch`] - HTTP retrieval of a candidate into the request's working file
//! - [`normalize`] - Decode, transcode, and size-fit (static PNG / animated GIF)
//! - [`upload`] - Remote create-emoji call and error-code classification
//! - [`pipeline`] - The variant retry loop and the progress channel

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod resolver;
pub mod upload;

// Re-export commonly used types
pub use constants::{FALLBACK_EMOTE_DIMENSIONS, MAX_EMOTE_BYTES, MAX_EMOTE_DIMENSIONS};
pub use fetch::{FetchClient, FetchError, FetchedImage};
pub use normalize::{NormalizeError, NormalizedImage, Normalizer, SizeFitPolicy};
pub use pipeline::{
    Notification, Pipeline, PipelineError, PipelineRequest, ProgressSink, Severity, StdoutSink,
    Workspace,
};
pub use resolver::{
    Candidate, EmoteAsset, ResolveError, Resolver, SourceDescriptor, SourceRegistry,
    build_default_registry, is_valid_name,
};
pub use upload::{DiscordUploader, EmoteUploader, UploadOutcome, decode_error_code};
