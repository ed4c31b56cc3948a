//! Error types for the doc2cast library.
//!
//! Two distinct error types reflect two distinct failure layers:
//!
//! * [`ConvertError`]: **Fatal** for one request: the conversion cannot
//!   produce a result (no content, unsupported upload, extraction or provider
//!   failure). Returned from [`crate::convert::Converter`] and mapped to a
//!   single HTTP status at the request boundary.
//!
//! * [`ProviderError`]: what a remote client ([`crate::provider`]) reports.
//!   The pipeline never surfaces it bare; it is wrapped as
//!   [`ConvertError::Upstream`] together with the provider name so callers
//!   see which collaborator failed without the provider's raw message
//!   reaching HTTP clients.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2cast pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Neither pasted text nor an uploaded file was supplied.
    #[error("No text or file was provided")]
    MissingContent,

    /// The effective source text is empty after trimming.
    #[error("The provided content is empty")]
    EmptyContent,

    /// The uploaded file is neither a PDF nor a Word document.
    #[error("Unsupported file type '{declared}': only PDF or Word documents are accepted")]
    UnsupportedFormat { declared: String },

    /// The request body could not be read or decoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request body exceeds the configured upload limit.
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The extraction library failed on a file that looked well-formed.
    #[error("Failed to extract text from {format} document: {detail}")]
    Extraction { format: String, detail: String },

    // ── Provider errors ───────────────────────────────────────────────────
    /// A remote provider call failed.
    #[error("{provider} provider call failed: {source}")]
    Upstream {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },

    /// A remote provider call did not answer within the configured timeout.
    #[error("{provider} provider call timed out after {secs}s")]
    UpstreamTimeout { provider: &'static str, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an artifact file.
    #[error("Failed to write artifact '{path}': {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ConvertError::MissingContent
            | ConvertError::EmptyContent
            | ConvertError::InvalidRequest(_) => 400,
            ConvertError::PayloadTooLarge(_) => 413,
            ConvertError::UnsupportedFormat { .. } => 415,
            ConvertError::Extraction { .. }
            | ConvertError::Upstream { .. }
            | ConvertError::UpstreamTimeout { .. }
            | ConvertError::ArtifactWrite { .. }
            | ConvertError::InvalidConfig(_)
            | ConvertError::Internal(_) => 500,
        }
    }

    /// Message safe to return to an HTTP client.
    ///
    /// Client errors echo the full message; server-side failures only name
    /// the failing stage so provider responses and file paths stay in logs.
    pub fn public_message(&self) -> String {
        match self {
            ConvertError::MissingContent
            | ConvertError::EmptyContent
            | ConvertError::UnsupportedFormat { .. }
            | ConvertError::InvalidRequest(_)
            | ConvertError::PayloadTooLarge(_) => self.to_string(),
            ConvertError::Extraction { format, .. } => {
                format!("Could not read text from the uploaded {format} document")
            }
            ConvertError::Upstream { provider, .. }
            | ConvertError::UpstreamTimeout { provider, .. } => {
                format!("The {provider} provider is unavailable, please try again later")
            }
            ConvertError::ArtifactWrite { .. }
            | ConvertError::InvalidConfig(_)
            | ConvertError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// `true` when the caller supplied bad input (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// An error reported by a remote provider client.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Transport failure or SDK-level error.
    #[error("request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered, but not with what we asked for.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No credentials or provider could be resolved.
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ConvertError::MissingContent.status_code(), 400);
        assert_eq!(ConvertError::EmptyContent.status_code(), 400);
        assert_eq!(
            ConvertError::UnsupportedFormat {
                declared: "txt".into()
            }
            .status_code(),
            415
        );
        assert_eq!(
            ConvertError::Extraction {
                format: "PDF".into(),
                detail: "bad xref".into()
            }
            .status_code(),
            500
        );
        assert_eq!(
            ConvertError::UpstreamTimeout {
                provider: "speech",
                secs: 60
            }
            .status_code(),
            500
        );
    }

    #[test]
    fn upstream_public_message_hides_provider_detail() {
        let e = ConvertError::Upstream {
            provider: "completion",
            source: ProviderError::Status {
                status: 401,
                body: "Incorrect API key provided: sk-abc123".into(),
            },
        };
        let public = e.public_message();
        assert!(public.contains("completion"), "got: {public}");
        assert!(!public.contains("sk-abc123"), "got: {public}");
        // The full chain is still available for logs.
        assert!(e.to_string().contains("HTTP 401"));
    }

    #[test]
    fn unsupported_format_display() {
        let e = ConvertError::UnsupportedFormat {
            declared: "text/plain".into(),
        };
        assert!(e.to_string().contains("text/plain"));
        assert!(e.is_client_error());
    }

    #[test]
    fn artifact_write_is_server_error() {
        let e = ConvertError::ArtifactWrite {
            path: PathBuf::from("/srv/audio/output-1.mp3"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!e.is_client_error());
        assert_eq!(e.public_message(), "Internal server error");
    }
}
