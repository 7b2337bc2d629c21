// flowgate-admin/src/error.rs
// ============================================================================
// Module: Admin Errors
// Description: Error taxonomy for admin API operations.
// Purpose: Classify validation, transport, remote, and decode failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every admin operation fails into exactly one of four kinds: the request
//! or response failed schema validation, the network call itself failed,
//! the runtime answered with a non-2xx status, or a 2xx payload could not
//! be decoded as the required representation. Nothing is retried and
//! nothing is swallowed; each error propagates to the tool caller as a
//! single descriptive failure.

use thiserror::Error;

/// Maximum number of payload characters embedded in decode errors.
pub const DECODE_PREVIEW_CHARS: usize = 50;

/// Admin API operation failures.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Request arguments or a runtime response failed schema validation.
    #[error("validation failed at {path}: {message}")]
    Validation {
        /// Path of the offending field.
        path: String,
        /// Human-readable validation failure.
        message: String,
    },
    /// Network failure reaching the runtime, or an unparseable 2xx body.
    #[error("failed to fetch {url}: {message}")]
    Transport {
        /// Target URL of the failed request.
        url: String,
        /// Underlying failure message.
        message: String,
    },
    /// Runtime responded with a non-2xx status.
    #[error("admin API error {status} {status_text}: {message}")]
    Remote {
        /// Numeric HTTP status code.
        status: u16,
        /// Canonical HTTP status text.
        status_text: String,
        /// Best-effort message recovered from the response body.
        message: String,
    },
    /// Response declared a non-JSON representation or a bounded preview of
    /// an unparseable payload.
    #[error("decode error: {0}")]
    Decode(String),
}

impl AdminError {
    /// Builds a validation error for the given field path.
    #[must_use]
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Truncates a payload to the bounded preview used in decode errors.
#[must_use]
pub fn decode_preview(payload: &str) -> String {
    if payload.chars().count() <= DECODE_PREVIEW_CHARS {
        return payload.to_string();
    }
    let preview: String = payload.chars().take(DECODE_PREVIEW_CHARS).collect();
    format!("{preview}...")
}

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions.
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::AdminError;
    use super::decode_preview;

    #[test]
    fn decode_preview_passes_short_payloads_verbatim() {
        assert_eq!(decode_preview("<html>"), "<html>");
    }

    #[test]
    fn decode_preview_truncates_long_payloads() {
        let payload = "x".repeat(200);
        let preview = decode_preview(&payload);
        assert_eq!(preview.chars().count(), 53);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn remote_error_embeds_status_and_message() {
        let err = AdminError::Remote {
            status: 409,
            status_text: "Conflict".to_string(),
            message: "deployment already exists".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("409"));
        assert!(text.contains("Conflict"));
        assert!(text.contains("deployment already exists"));
    }
}
