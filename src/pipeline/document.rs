//! Minimal `.docx` writer.
//!
//! Produces the smallest OOXML package Word and LibreOffice open: a content
//! types part, the package relationships and one `word/document.xml` holding
//! the text as a single paragraph. Line breaks inside the text become
//! `<w:br/>` so the document keeps the completion's layout.

use crate::error::ConvertError;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r>"#;

const DOCUMENT_TAIL: &str = "</w:r></w:p></w:body></w:document>";

/// Serialize `text` as a single-paragraph `.docx`.
pub fn build_docx(text: &str) -> Result<Vec<u8>, ConvertError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/document.xml", document_xml(text)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).map_err(docx_error)?;
        zip.write_all(body.as_bytes())
            .map_err(|e| ConvertError::Internal(format!("docx write: {e}")))?;
    }

    let cursor = zip.finish().map_err(docx_error)?;
    Ok(cursor.into_inner())
}

fn docx_error(e: zip::result::ZipError) -> ConvertError {
    ConvertError::Internal(format!("docx packaging: {e}"))
}

/// `word/document.xml` with one run; lines separated by `<w:br/>`.
fn document_xml(text: &str) -> String {
    let mut xml = String::with_capacity(DOCUMENT_HEAD.len() + text.len() + 64);
    xml.push_str(DOCUMENT_HEAD);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        let line: String = line
            .trim_end_matches('\r')
            .chars()
            .filter(|c| !is_forbidden_control(*c))
            .collect();
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape(line.as_str()));
        xml.push_str("</w:t>");
    }
    xml.push_str(DOCUMENT_TAIL);
    xml
}

/// XML 1.0 has no representation for C0 controls other than tab/LF/CR.
fn is_forbidden_control(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::document_xml_to_text;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn package_has_required_parts() {
        let bytes = build_docx("hello").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<_> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["[Content_Types].xml", "_rels/.rels", "word/document.xml"]
        );
    }

    #[test]
    fn text_is_escaped() {
        let bytes = build_docx("a < b & \"c\"").unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn reads_back_through_extractor() {
        let text = "Özet\nİkinci satır & <son>";
        let bytes = build_docx(text).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert_eq!(document_xml_to_text(&xml).unwrap(), text);
    }

    #[test]
    fn control_characters_are_dropped() {
        let bytes = build_docx("a\u{0}b\u{1b}c\td").unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert_eq!(document_xml_to_text(&xml).unwrap(), "abc\td");
    }
}
