use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use zip::ZipArchive;

use super::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Inflated size cap for `word/document.xml`. A real CV is well under 1 MiB;
/// the compressed upload limit says nothing about what a part inflates to.
pub(super) const MAX_DOCUMENT_XML_BYTES: u64 = 16 * 1024 * 1024;

/// Containers whose paragraphs belong to floating shapes, not the body text.
const SHAPE_CONTAINERS: &[&[u8]] = &[b"txbxContent", b"drawing", b"pict"];

/// Reads `word/document.xml` out of the DOCX container and flattens it to text.
pub(super) fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    extract_docx_with_limit(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_docx_with_limit(bytes: &[u8], limit: u64) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Corrupt(format!("docx container: {e}")))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| DocumentError::Corrupt(format!("{DOCUMENT_PART}: {e}")))?;

    // The declared size can lie, so the read itself is capped as well.
    if part.size() > limit {
        return Err(DocumentError::TooLarge { limit });
    }
    let mut xml = String::new();
    part.take(limit + 1)
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Corrupt(format!("{DOCUMENT_PART}: {e}")))?;
    if xml.len() as u64 > limit {
        return Err(DocumentError::TooLarge { limit });
    }

    paragraphs_from_xml(&xml)
}

/// One line per paragraph directly under `<w:body>`. Table cells and text
/// boxes are skipped, as are whitespace nodes between elements: only `<w:t>`
/// content inside a body paragraph counts as text.
fn paragraphs_from_xml(xml: &str) -> Result<String, DocumentError> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_body_paragraph = false;
    let mut in_text_run = false;
    let mut shape_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let name = start.local_name().as_ref().to_vec();
                let parent_is_body = stack.last().map(Vec::as_slice) == Some(b"body".as_slice());
                if name == b"p" && parent_is_body {
                    in_body_paragraph = true;
                    current.clear();
                } else if name == b"t" {
                    in_text_run = true;
                } else if in_body_paragraph && SHAPE_CONTAINERS.contains(&name.as_slice()) {
                    shape_depth += 1;
                }
                stack.push(name);
            }
            Ok(Event::Text(text)) if in_text_run && in_body_paragraph && shape_depth == 0 => {
                let text = text
                    .unescape()
                    .map_err(|e| DocumentError::Corrupt(format!("xml text: {e}")))?;
                current.push_str(&text);
            }
            Ok(Event::Empty(empty)) => {
                let parent_is_body = stack.last().map(Vec::as_slice) == Some(b"body".as_slice());
                match empty.local_name().as_ref() {
                    // self-closing paragraph: an empty line
                    b"p" if parent_is_body => paragraphs.push(String::new()),
                    b"br" | b"cr" if in_body_paragraph && shape_depth == 0 => current.push('\n'),
                    b"tab" if in_body_paragraph && shape_depth == 0 => current.push(' '),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                let name = stack.pop().unwrap_or_default();
                let parent_is_body = stack.last().map(Vec::as_slice) == Some(b"body".as_slice());
                if name == b"p" && parent_is_body {
                    paragraphs.push(std::mem::take(&mut current));
                    in_body_paragraph = false;
                } else if name == b"t" {
                    in_text_run = false;
                } else if in_body_paragraph && SHAPE_CONTAINERS.contains(&name.as_slice()) {
                    shape_depth = shape_depth.saturating_sub(1);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Corrupt(format!("xml: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}
