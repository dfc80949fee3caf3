//! The outbound progress channel.
//!
//! The pipeline reports an ordered sequence of `(text, severity)`
//! notifications; the dispatch layer consumes them to post or edit a single
//! user-visible message per request. Severity also decides the decoration
//! prefix prepended to every user-visible message.

use async_trait::async_trait;

/// Severity of one progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine progress (per-attempt updates).
    Default,
    /// Permission or validation failure, raised before any network call.
    Warning,
    /// Terminal failure.
    Error,
    /// The emote was uploaded.
    Success,
}

impl Severity {
    /// Decoration prefix for user-visible rendering.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Warning => ":warning: ",
            Self::Error => ":x: ",
            Self::Success => ":white_check_mark: ",
        }
    }

    /// Prepends the severity prefix to a message.
    #[must_use]
    pub fn decorate(self, text: &str) -> String {
        format!("{}{text}", self.prefix())
    }
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Human-facing message text (undecorated).
    pub text: String,
    /// Severity of this update.
    pub severity: Severity,
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Consumer of the pipeline's ordered notification stream.
///
/// Implementations post/edit a chat message, print to a terminal, or (in
/// tests) record the sequence for assertions.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Delivers one notification. Ordering follows pipeline state
    /// transitions; the final notification of a request is always a
    /// success or an error/warning.
    async fn notify(&self, notification: Notification);
}

/// Sink that prints decorated notifications to stdout (CLI surface).
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl ProgressSink for StdoutSink {
    async fn notify(&self, notification: Notification) {
        println!("{}", notification.severity.decorate(&notification.text));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decoration_prefixes() {
        assert_eq!(Severity::Default.decorate("msg"), "msg");
        assert_eq!(Severity::Warning.decorate("msg"), ":warning: msg");
        assert_eq!(Severity::Error.decorate("msg"), ":x: msg");
        assert_eq!(Severity::Success.decorate("msg"), ":white_check_mark: msg");
    }

    #[test]
    fn test_notification_new() {
        let note = Notification::new("done", Severity::Success);
        assert_eq!(note.text, "done");
        assert_eq!(note.severity, Severity::Success);
    }
}
