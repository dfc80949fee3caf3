//! Upload outcomes and remote error-code classification.
//!
//! The remote rejects a create-emoji call with a human-readable message
//! embedding a machine-readable code of the shape `(error code: <digits>):`.
//! [`decode_error_code`] extracts the code; [`classify_rejection`] maps it
//! onto the outcome taxonomy the retry loop acts on. Only
//! [`UploadOutcome::SizeRejected`] is retryable; every other non-success
//! outcome terminates the loop.

use std::sync::LazyLock;

use regex::Regex;

/// Remote code: the collection is at capacity.
pub const CODE_QUOTA_EXCEEDED: u32 = 30008;
/// Remote code: payload too large.
pub const CODE_PAYLOAD_TOO_LARGE: u32 = 50138;
/// Remote code: encoding rejected.
pub const CODE_FORMAT_REJECTED: u32 = 50045;
/// Remote code: name length rejected.
pub const CODE_NAME_REJECTED: u32 = 50035;

/// Matches the machine-readable code embedded in remote error messages,
/// e.g. `"... (error code: 50138): Payload Too Large"`.
#[allow(clippy::expect_used)]
static ERROR_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(error code:\s*(\d+)\):").expect("error code regex is valid")
    // Static pattern, safe to panic
});

/// Result of one upload attempt.
///
/// Terminal for the retry loop except [`UploadOutcome::SizeRejected`],
/// which escalates to the next smaller candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The emote was created.
    Success,
    /// The remote rejected the payload for size; carries the raw message.
    SizeRejected(String),
    /// The caller lacks permission to manage the collection.
    PermissionDenied,
    /// The collection is at capacity.
    QuotaExceeded,
    /// The remote rejected the encoding.
    FormatRejected,
    /// The remote rejected the name length.
    NameRejected,
    /// An unrecognized remote rejection.
    UnknownRemoteError {
        /// Extracted code, or 0 when no code pattern was found.
        code: u32,
        /// Raw remote message.
        message: String,
    },
    /// Transport-level failure (network, timeout, local file read).
    TransportError(String),
}

impl UploadOutcome {
    /// True only for [`UploadOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// True for the sole retryable signal, a remote size rejection.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SizeRejected(_))
    }

    /// Human-facing text for the final notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Success => "Emote uploaded to the server.".to_string(),
            Self::SizeRejected(_) => {
                "Image too large and could not be uploaded to the server.".to_string()
            }
            Self::PermissionDenied => {
                "Missing permission to manage emotes on this server.".to_string()
            }
            Self::QuotaExceeded => "Maximum number of emotes reached.".to_string(),
            Self::FormatRejected => "Format error during upload.".to_string(),
            Self::NameRejected => {
                "Emote name must be between 2 and 32 characters long.\n\
                 Please provide a shorter name to override the source name if not done so already."
                    .to_string()
            }
            Self::UnknownRemoteError { code, .. } => {
                format!("Unknown upload error (remote code {code}).")
            }
            Self::TransportError(message) => format!("Unable to reach the server: {message}"),
        }
    }
}

/// Extracts the numeric code from a remote error message, or 0 when the
/// message carries no recognizable code pattern.
#[must_use]
pub fn decode_error_code(message: &str) -> u32 {
    ERROR_CODE_PATTERN
        .captures(message)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(0)
}

/// Classifies a remote rejection (HTTP status plus response body) into an
/// [`UploadOutcome`].
///
/// | Code  | Outcome            |
/// |-------|--------------------|
/// | 30008 | `QuotaExceeded`    |
/// | 50138 | `SizeRejected`     |
/// | 50045 | `FormatRejected`   |
/// | 50035 | `NameRejected`     |
/// | other | `UnknownRemoteError` |
///
/// A body with no decodable code yields code 0: `PermissionDenied` when the
/// status is 403, otherwise `UnknownRemoteError`.
#[must_use]
pub fn classify_rejection(status: u16, body: &str) -> UploadOutcome {
    match decode_error_code(body) {
        CODE_QUOTA_EXCEEDED => UploadOutcome::QuotaExceeded,
        CODE_PAYLOAD_TOO_LARGE => UploadOutcome::SizeRejected(body.to_string()),
        CODE_FORMAT_REJECTED => UploadOutcome::FormatRejected,
        CODE_NAME_REJECTED => UploadOutcome::NameRejected,
        0 if status == 403 => UploadOutcome::PermissionDenied,
        code => UploadOutcome::UnknownRemoteError {
            code,
            message: body.to_string(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== Code Decoding Tests ====================

    #[test]
    fn test_decode_known_code() {
        let code = decode_error_code("400 Bad Request (error code: 50138): Payload Too Large");
        assert_eq!(code, 50138);
    }

    #[test]
    fn test_decode_tolerates_extra_whitespace() {
        assert_eq!(decode_error_code("(error code:  30008): full"), 30008);
    }

    #[test]
    fn test_decode_unrecognized_message_is_zero() {
        assert_eq!(decode_error_code("Internal Server Error"), 0);
        assert_eq!(decode_error_code(""), 0);
        assert_eq!(decode_error_code("(error code: abc): nope"), 0);
    }

    // ==================== Classification Tests ====================

    #[test]
    fn test_classify_quota() {
        let outcome = classify_rejection(400, "(error code: 30008): Maximum number of emojis");
        assert_eq!(outcome, UploadOutcome::QuotaExceeded);
    }

    #[test]
    fn test_classify_size_rejected_carries_message() {
        let body = "400 Bad Request (error code: 50138): Payload Too Large";
        let outcome = classify_rejection(400, body);
        assert_eq!(outcome, UploadOutcome::SizeRejected(body.to_string()));
        assert!(outcome.is_retryable());
    }

    #[test]
    fn test_classify_format_rejected() {
        let outcome = classify_rejection(400, "(error code: 50045): Invalid image");
        assert_eq!(outcome, UploadOutcome::FormatRejected);
        assert!(!outcome.is_retryable());
    }

    #[test]
    fn test_classify_name_rejected() {
        let outcome = classify_rejection(400, "(error code: 50035): Invalid Form Body");
        assert_eq!(outcome, UploadOutcome::NameRejected);
    }

    #[test]
    fn test_classify_unknown_code() {
        let outcome = classify_rejection(400, "(error code: 10004): Unknown Guild");
        assert_eq!(
            outcome,
            UploadOutcome::UnknownRemoteError {
                code: 10004,
                message: "(error code: 10004): Unknown Guild".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_codeless_403_is_permission_denied() {
        let outcome = classify_rejection(403, "Forbidden");
        assert_eq!(outcome, UploadOutcome::PermissionDenied);
    }

    #[test]
    fn test_classify_codeless_body_is_unknown_with_code_zero() {
        let outcome = classify_rejection(500, "Internal Server Error");
        assert_eq!(
            outcome,
            UploadOutcome::UnknownRemoteError {
                code: 0,
                message: "Internal Server Error".to_string(),
            }
        );
    }

    // ==================== Outcome Property Tests ====================

    #[test]
    fn test_only_size_rejected_is_retryable() {
        assert!(UploadOutcome::SizeRejected(String::new()).is_retryable());
        for outcome in [
            UploadOutcome::Success,
            UploadOutcome::PermissionDenied,
            UploadOutcome::QuotaExceeded,
            UploadOutcome::FormatRejected,
            UploadOutcome::NameRejected,
            UploadOutcome::UnknownRemoteError {
                code: 0,
                message: String::new(),
            },
            UploadOutcome::TransportError(String::new()),
        ] {
            assert!(!outcome.is_retryable(), "Unexpected retryable: {outcome:?}");
        }
    }

    #[test]
    fn test_user_messages_are_nonempty() {
        for outcome in [
            UploadOutcome::Success,
            UploadOutcome::SizeRejected("x".into()),
            UploadOutcome::PermissionDenied,
            UploadOutcome::QuotaExceeded,
            UploadOutcome::FormatRejected,
            UploadOutcome::NameRejected,
            UploadOutcome::UnknownRemoteError {
                code: 1,
                message: "m".into(),
            },
            UploadOutcome::TransportError("down".into()),
        ] {
            assert!(!outcome.user_message().is_empty());
        }
    }
}
