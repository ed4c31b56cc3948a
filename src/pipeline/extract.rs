//! Text extraction from uploaded PDF and Word documents.
//!
//! ## Why spool to a temp file?
//!
//! Uploads arrive in memory, but extraction libraries are happiest with a
//! file path, and the service must never leave upload copies behind. The
//! bytes are written to a [`tempfile::NamedTempFile`] that is moved into the
//! blocking extraction task and dropped there, so the file is deleted on
//! success, on an extraction error and when the library panics.
//!
//! ## Why spawn_blocking?
//!
//! PDF parsing is CPU-bound and synchronous. Running it on Tokio's blocking
//! pool keeps the async workers free to serve other requests.

use crate::error::ConvertError;
use crate::output::{ExtractedContent, SourceKind};
use crate::pipeline::input::{DocumentFormat, UploadedFile};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracts plain text from a document on disk.
///
/// Called from a blocking thread; implementations may do synchronous I/O.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path, format: DocumentFormat) -> Result<String, ConvertError>;
}

/// Default extractor: `pdf-extract` for PDF, OOXML text runs for Word.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path, format: DocumentFormat) -> Result<String, ConvertError> {
        match format {
            DocumentFormat::Pdf => extract_pdf(path),
            DocumentFormat::Word => extract_word(path),
        }
    }
}

/// Spool `file` to a scoped temp file and extract its text.
pub async fn extract_upload(
    extractor: Arc<dyn TextExtractor>,
    file: &UploadedFile,
    format: DocumentFormat,
) -> Result<ExtractedContent, ConvertError> {
    let bytes = file.bytes.clone();
    let suffix = match format {
        DocumentFormat::Pdf => ".pdf",
        DocumentFormat::Word => ".docx",
    };

    let text = tokio::task::spawn_blocking(move || {
        let mut tmp = tempfile::Builder::new()
            .prefix("doc2cast-upload-")
            .suffix(suffix)
            .tempfile()
            .map_err(|e| ConvertError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| ConvertError::Internal(format!("tempfile write: {e}")))?;

        // `tmp` is dropped (and the file deleted) when this closure returns
        extractor.extract(tmp.path(), format)
    })
    .await
    .map_err(|e| {
        warn!("{} extraction task failed: {}", format.name(), e);
        ConvertError::Extraction {
            format: format.name().to_string(),
            detail: "extraction library panicked".to_string(),
        }
    })??;

    debug!("Extracted {} chars from {} upload", text.chars().count(), format.name());

    let source_kind = match format {
        DocumentFormat::Pdf => SourceKind::PdfDocument,
        DocumentFormat::Word => SourceKind::WordDocument,
    };
    Ok(ExtractedContent::new(text, source_kind))
}

fn extract_pdf(path: &Path) -> Result<String, ConvertError> {
    pdf_extract::extract_text(path).map_err(|e| ConvertError::Extraction {
        format: DocumentFormat::Pdf.name().to_string(),
        detail: e.to_string(),
    })
}

fn extract_word(path: &Path) -> Result<String, ConvertError> {
    let fail = |detail: String| ConvertError::Extraction {
        format: DocumentFormat::Word.name().to_string(),
        detail,
    };

    let file = std::fs::File::open(path).map_err(|e| fail(e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| fail(format!("not an OOXML package: {e}")))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| fail(format!("word/document.xml: {e}")))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| fail(e.to_string()))?;

    document_xml_to_text(&xml).map_err(|e| fail(format!("word/document.xml: {e}")))
}

/// Flatten `word/document.xml` to plain text.
///
/// Text runs are concatenated, `<w:tab/>` becomes a tab, `<w:br/>` a line
/// break, and every paragraph (empty ones included) is followed by a blank
/// line.
pub fn document_xml_to_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(ref e) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                b"w:p" => out.push_str("\n\n"),
                _ => {}
            },
            // tab stops in paragraph properties are also `<w:tab/>`
            Event::Empty(ref e) => match e.name().as_ref() {
                b"w:p" => out.push_str("\n\n"),
                b"w:tab" if in_run => out.push('\t'),
                b"w:br" | b"w:cr" if in_run => out.push('\n'),
                _ => {}
            },
            Event::Text(ref e) if in_text => out.push_str(&e.unescape()?),
            Event::CData(ref e) if in_text => out.push_str(&String::from_utf8_lossy(e)),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out.trim_end().to_string())
}
