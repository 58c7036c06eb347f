//! Text extraction for uploaded CVs and transcripts.
//!
//! DOCX is the primary format. PDF and plain text are accepted so a recruiter
//! can drop in whatever the candidate sent. All extracted text is lowercased
//! because every consumer (keyword scoring, prompts) works on lowercase text.

mod docx;

use serde::Serialize;
use thiserror::Error;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document type: {0}")]
    Unsupported(String),

    #[error("document contains no readable text")]
    Empty,

    #[error("document could not be read: {0}")]
    Corrupt(String),

    #[error("document inflates past {limit} bytes")]
    TooLarge { limit: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Docx,
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Detects the document kind from the upload's file name, falling back to
    /// its declared content type. Browsers often send `application/octet-stream`
    /// so the extension wins when present.
    pub fn detect(
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<DocumentKind, DocumentError> {
        if let Some(kind) = file_name.and_then(Self::from_extension) {
            return Ok(kind);
        }
        if let Some(kind) = content_type.and_then(Self::from_mime) {
            return Ok(kind);
        }
        Err(DocumentError::Unsupported(
            file_name
                .or(content_type)
                .unwrap_or("unnamed upload")
                .to_string(),
        ))
    }

    fn from_extension(file_name: &str) -> Option<DocumentKind> {
        let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(DocumentKind::Docx),
            "pdf" => Some(DocumentKind::Pdf),
            "txt" | "md" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    fn from_mime(content_type: &str) -> Option<DocumentKind> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            DOCX_MIME => Some(DocumentKind::Docx),
            "application/pdf" => Some(DocumentKind::Pdf),
            m if m.starts_with("text/") => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

/// Extracts lowercase text from an uploaded document.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, DocumentError> {
    let text = match kind {
        DocumentKind::Docx => docx::extract_docx(bytes)?,
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocumentError::Corrupt(format!("pdf: {e}")))?,
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
    };

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }

    Ok(text.to_lowercase())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Builds a minimal DOCX container holding one paragraph per input line.
    pub(crate) fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        zip_with_document_xml(&xml)
    }

    /// Wraps raw XML as `word/document.xml` in a deflated ZIP container.
    pub(crate) fn zip_with_document_xml(xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", FileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_detect_by_extension_is_case_insensitive() {
        let kind = DocumentKind::detect(Some("Jane_Doe_CV.DOCX"), None).unwrap();
        assert_eq!(kind, DocumentKind::Docx);
    }

    #[test]
    fn test_extension_wins_over_octet_stream() {
        let kind =
            DocumentKind::detect(Some("cv.pdf"), Some("application/octet-stream")).unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_detect_falls_back_to_mime() {
        let kind = DocumentKind::detect(Some("upload"), Some(DOCX_MIME)).unwrap();
        assert_eq!(kind, DocumentKind::Docx);

        let kind = DocumentKind::detect(None, Some("text/plain; charset=utf-8")).unwrap();
        assert_eq!(kind, DocumentKind::PlainText);
    }

    #[test]
    fn test_detect_rejects_unknown() {
        let err = DocumentKind::detect(Some("cv.exe"), Some("application/x-msdownload"))
            .unwrap_err();
        assert!(matches!(err, DocumentError::Unsupported(name) if name == "cv.exe"));
    }

    #[test]
    fn test_plain_text_is_lowercased() {
        let text = extract_text(DocumentKind::PlainText, b"Led the SQL migration").unwrap();
        assert_eq!(text, "led the sql migration");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let err = extract_text(DocumentKind::PlainText, b" \n\t ").unwrap_err();
        assert!(matches!(err, DocumentError::Empty));
    }

    #[test]
    fn test_docx_paragraphs_joined_by_newline() {
        let bytes = docx_fixture(&["Jane Doe", "Built Tableau dashboards"]);
        let text = extract_text(DocumentKind::Docx, &bytes).unwrap();
        assert_eq!(text, "jane doe\nbuilt tableau dashboards");
    }
}
