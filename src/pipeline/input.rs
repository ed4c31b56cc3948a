//! Input resolution: decide which source a request's text comes from.
//!
//! Pasted text always wins over an upload. An upload's format is taken from
//! its MIME type when that is specific, otherwise from the file-name
//! extension (case-insensitive). Unknown formats are rejected here, before
//! any bytes are spooled to disk or handed to an extraction library.

use crate::error::ConvertError;
use std::path::Path;

/// MIME type of `.docx` files.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME type of legacy `.doc` files.
pub const DOC_MIME: &str = "application/msword";

/// One conversion request, transport-agnostic.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Pasted text. Empty strings count as absent.
    pub raw_text: Option<String>,
    pub uploaded_file: Option<UploadedFile>,
    /// Mode label; the configured default applies when absent.
    pub mode: Option<String>,
    /// Per-request override of [`crate::ServiceConfig::generate_document`].
    pub generate_document: Option<bool>,
}

impl ConversionRequest {
    /// Request for pasted text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            raw_text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Request for an uploaded file.
    pub fn file(file: UploadedFile) -> Self {
        Self {
            uploaded_file: Some(file),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_document(mut self, v: bool) -> Self {
        self.generate_document = Some(v);
        self
    }

    /// Resolve the effective source.
    pub fn source(&self) -> Result<Source<'_>, ConvertError> {
        if let Some(text) = self.raw_text.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Source::Text(text));
        }
        match self.uploaded_file {
            Some(ref file) => Ok(Source::Upload {
                file,
                format: file.declared_format()?,
            }),
            None => Err(ConvertError::MissingContent),
        }
    }
}

/// The effective source of a request.
#[derive(Debug)]
pub enum Source<'a> {
    Text(&'a str),
    Upload {
        file: &'a UploadedFile,
        format: DocumentFormat,
    },
}

/// An uploaded file held in memory.
#[derive(Clone, Default)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    /// `Content-Type` of the multipart field, if any.
    pub declared_mime: Option<String>,
    /// Client-side file name, if any.
    pub original_name: Option<String>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("bytes", &self.bytes.len())
            .field("declared_mime", &self.declared_mime)
            .field("original_name", &self.original_name)
            .finish()
    }
}

impl UploadedFile {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        declared_mime: Option<&str>,
        original_name: Option<&str>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            declared_mime: declared_mime.map(str::to_string),
            original_name: original_name.map(str::to_string),
        }
    }

    /// Detect the document format, preferring the MIME type.
    pub fn declared_format(&self) -> Result<DocumentFormat, ConvertError> {
        let mime = self
            .declared_mime
            .as_deref()
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());

        if let Some(format) = mime.as_deref().and_then(DocumentFormat::from_mime) {
            return Ok(format);
        }

        let extension = self.original_name.as_deref().and_then(extension_of);
        if let Some(format) = extension.as_deref().and_then(DocumentFormat::from_extension) {
            return Ok(format);
        }

        let declared = match (mime, extension) {
            (Some(m), _) if !is_generic_mime(&m) => m,
            (_, Some(ext)) => format!(".{ext}"),
            (Some(m), None) => m,
            (None, None) => "unknown".to_string(),
        };
        Err(ConvertError::UnsupportedFormat { declared })
    }
}

/// Formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    /// `.docx`, and `.doc` uploads (read as OOXML; true legacy binaries
    /// fail extraction).
    Word,
}

impl DocumentFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(DocumentFormat::Pdf),
            DOCX_MIME | DOC_MIME => Some(DocumentFormat::Word),
            _ => None,
        }
    }

    /// Case-insensitive extension lookup, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" | "doc" => Some(DocumentFormat::Word),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Word => "Word",
        }
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// MIME types browsers send when they do not know better.
fn is_generic_mime(mime: &str) -> bool {
    matches!(mime, "application/octet-stream" | "binary/octet-stream")
}
