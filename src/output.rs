//! Output types produced by the pipeline.
//!
//! [`TransformationResult`] is what the remote calls produced, still in
//! memory. [`ConvertResponse`] is the wire shape returned to HTTP clients
//! once artifacts have been persisted and given public locations.

use crate::mode::Strategy;
use serde::{Deserialize, Serialize};

/// Where the effective source text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PastedText,
    PdfDocument,
    WordDocument,
}

/// Plain text resolved from a request, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub source_kind: SourceKind,
}

impl ExtractedContent {
    pub fn new(text: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            text: text.into(),
            source_kind,
        }
    }
}

/// Everything the remote transformations produced for one request.
#[derive(Debug, Clone)]
pub struct TransformationResult {
    /// Completion output, or the narration text for speech mode, or the
    /// image prompt for image mode. Always present.
    pub primary_text: String,

    /// MP3 bytes from the speech provider.
    pub audio: Option<Vec<u8>>,

    /// `.docx` bytes wrapping `primary_text`.
    pub document: Option<Vec<u8>>,

    /// Remote URL returned by the image provider.
    pub image_url: Option<String>,

    pub strategy: Strategy,
    pub source_kind: SourceKind,
}

/// JSON body of a successful `POST /api/convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub completion: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
