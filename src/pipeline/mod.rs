//! The variant retry loop.
//!
//! Drives resolve, fetch, normalize, and upload across the ordered
//! candidate list. The loop is a small state machine: `TryCandidate(i)`
//! escalates to `TryCandidate(i + 1)` only on a remote size rejection,
//! falls back to one forced manual resize after the last candidate, and
//! stops immediately on every other outcome. Progress is reported through
//! the [`ProgressSink`] after each state transition, and every notification
//! with a non-default severity is also written to the audit log together
//! with the original invocation text.

mod progress;
mod workspace;

pub use progress::{Notification, ProgressSink, Severity, StdoutSink};
pub use workspace::Workspace;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::fetch::{FetchClient, FetchError};
use crate::normalize::{NormalizeError, NormalizedImage, Normalizer};
use crate::resolver::{ResolveError, SourceDescriptor, SourceRegistry};
use crate::upload::{EmoteUploader, UploadOutcome};

/// One inbound request from the dispatch layer.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// The classified emote source.
    pub descriptor: SourceDescriptor,
    /// Explicit name override; wins over any provider-declared name.
    pub suggested_name: Option<String>,
    /// Capability flag checked before anything else runs.
    pub has_manage_emotes: bool,
    /// Original invocation text, forwarded to the audit log alongside
    /// warning/error/success notifications.
    pub invocation: String,
}

/// Terminal pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller lacks the manage-emotes capability.
    #[error("missing manage-emotes permission")]
    NotPermitted,

    /// Source resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A candidate could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The working file could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The remote rejected the upload with a terminal outcome.
    #[error("{}", .0.user_message())]
    Upload(UploadOutcome),

    /// The request-scoped working directory could not be prepared.
    #[error("failed to prepare working directory: {source}")]
    Workspace {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// The acquisition-and-fitting pipeline for one guild collection.
///
/// One `Pipeline` may serve many requests concurrently; each call to
/// [`Pipeline::run`] owns a unique working file and shares no mutable
/// state with its siblings.
pub struct Pipeline {
    registry: SourceRegistry,
    fetcher: FetchClient,
    normalizer: Normalizer,
    uploader: Arc<dyn EmoteUploader>,
    working_dir: PathBuf,
}

impl Pipeline {
    /// Assembles a pipeline from its collaborators.
    #[must_use]
    pub fn new(
        registry: SourceRegistry,
        fetcher: FetchClient,
        normalizer: Normalizer,
        uploader: Arc<dyn EmoteUploader>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            normalizer,
            uploader,
            working_dir: working_dir.into(),
        }
    }

    /// Runs one request start to finish.
    ///
    /// Every exit path delivers exactly one final notification: `warning`
    /// for permission/validation refusals raised before any network call,
    /// `error` for terminal failures, `success` on upload. The working
    /// file is deleted on every exit path.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`PipelineError`]; the sole retryable signal
    /// (a remote size rejection) is handled internally by escalating to
    /// the next smaller candidate.
    #[instrument(skip(self, request, sink), fields(source = request.descriptor.url()))]
    pub async fn run(
        &self,
        request: &PipelineRequest,
        sink: &dyn ProgressSink,
    ) -> Result<(), PipelineError> {
        if !request.has_manage_emotes {
            self.emit(
                sink,
                request,
                "You do not have sufficient permissions to use this command.",
                Severity::Warning,
            )
            .await;
            return Err(PipelineError::NotPermitted);
        }

        let asset = match self
            .registry
            .resolve(&request.descriptor, request.suggested_name.as_deref())
            .await
        {
            Ok(asset) => asset,
            Err(e) => {
                let severity = if e.is_validation() {
                    Severity::Warning
                } else {
                    Severity::Error
                };
                self.emit(sink, request, &e.to_string(), severity).await;
                return Err(e.into());
            }
        };
        if asset.candidates.is_empty() {
            let e = ResolveError::no_suitable_variant(asset.source_id.as_deref().unwrap_or("?"));
            self.emit(sink, request, &e.to_string(), Severity::Error).await;
            return Err(e.into());
        }

        let workspace = match Workspace::create(&self.working_dir) {
            Ok(workspace) => workspace,
            Err(source) => {
                self.emit(
                    sink,
                    request,
                    "Internal error while preparing the working directory.",
                    Severity::Error,
                )
                .await;
                return Err(PipelineError::Workspace { source });
            }
        };

        debug!(
            name = %asset.name,
            candidates = asset.candidates.len(),
            request_id = workspace.request_id(),
            "Starting candidate loop"
        );

        let total = asset.candidates.len();
        let mut last_rejected: Option<NormalizedImage> = None;
        for (index, candidate) in asset.candidates.iter().enumerate() {
            let fetched = match self.fetcher.fetch(&candidate.url, &workspace.file_stem()).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    self.emit(sink, request, &e.to_string(), Severity::Error).await;
                    return Err(e.into());
                }
            };
            let normalized = match self.normalizer.normalize(&fetched.path) {
                Ok(normalized) => normalized,
                Err(e) => {
                    self.emit(sink, request, &e.to_string(), Severity::Error).await;
                    return Err(e.into());
                }
            };

            let outcome = self.uploader.upload(&asset.name, &normalized.path).await;
            match outcome {
                UploadOutcome::Success => {
                    self.emit(
                        sink,
                        request,
                        &format!("Emote '{}' uploaded to the server.", asset.name),
                        Severity::Success,
                    )
                    .await;
                    return Ok(());
                }
                UploadOutcome::SizeRejected(_) if index + 1 < total => {
                    self.emit(
                        sink,
                        request,
                        &format!(
                            "Size rejected on attempt {} of {total}; trying the next smaller size...",
                            index + 1
                        ),
                        Severity::Default,
                    )
                    .await;
                }
                UploadOutcome::SizeRejected(_) => {
                    last_rejected = Some(normalized);
                    break;
                }
                terminal => {
                    self.emit(sink, request, &terminal.user_message(), Severity::Error)
                        .await;
                    return Err(PipelineError::Upload(terminal));
                }
            }
        }

        // Every candidate was size-rejected: one forced resize, one more try.
        let Some(image) = last_rejected else {
            // Unreachable with a non-empty candidate list; keep the exit
            // path noisy rather than silent.
            let outcome = UploadOutcome::TransportError("candidate loop made no attempt".into());
            self.emit(sink, request, &outcome.user_message(), Severity::Error)
                .await;
            return Err(PipelineError::Upload(outcome));
        };
        self.emit(
            sink,
            request,
            "Every size was rejected; resizing manually for one final attempt...",
            Severity::Default,
        )
        .await;
        let forced = match self.normalizer.force_fit(&image.path) {
            Ok(forced) => forced,
            Err(e) => {
                self.emit(sink, request, &e.to_string(), Severity::Error).await;
                return Err(e.into());
            }
        };
        let outcome = self.uploader.upload(&asset.name, &forced.path).await;
        if outcome.is_success() {
            self.emit(
                sink,
                request,
                &format!("Emote '{}' uploaded to the server.", asset.name),
                Severity::Success,
            )
            .await;
            Ok(())
        } else {
            self.emit(sink, request, &outcome.user_message(), Severity::Error)
                .await;
            Err(PipelineError::Upload(outcome))
        }
    }

    /// Delivers a notification and mirrors non-default severities to the
    /// audit log with the original invocation text.
    async fn emit(
        &self,
        sink: &dyn ProgressSink,
        request: &PipelineRequest,
        text: &str,
        severity: Severity,
    ) {
        match severity {
            Severity::Default => debug!(text, "Progress"),
            Severity::Warning => warn!(invocation = %request.invocation, text, "Progress"),
            Severity::Error => error!(invocation = %request.invocation, text, "Progress"),
            Severity::Success => info!(invocation = %request.invocation, text, "Progress"),
        }
        sink.notify(Notification::new(text, severity)).await;
    }
}
