//! Text extraction for uploaded résumé documents.
//!
//! Extraction operates on a private temporary copy of the uploaded bytes, so
//! the caller's buffer is never consumed or repositioned. A document that
//! cannot be parsed is recovered as empty text with a page count of 1; the
//! intake gate then rejects it on the length rule. Only an undeclared or
//! unknown MIME type is an error.

use std::io::{Read, Write};

use lopdf::Document;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Text pulled out of an uploaded document.
///
/// `page_count` reflects the container structure and is measured
/// independently of whether text extraction succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

impl ExtractedText {
    fn recovered() -> Self {
        Self {
            text: String::new(),
            page_count: 1,
        }
    }
}

/// Extracts text and page count from an uploaded document.
pub fn extract(bytes: &[u8], mime: &str) -> Result<ExtractedText, ExtractError> {
    let kind = DocumentKind::from_mime(mime)
        .ok_or_else(|| ExtractError::UnsupportedFormat(mime.to_string()))?;

    let tmp = match write_temp_copy(bytes) {
        Ok(t) => t,
        Err(e) => {
            warn!("Failed to stage upload in a temp file: {e}");
            return Ok(ExtractedText::recovered());
        }
    };

    let extracted = match kind {
        DocumentKind::Pdf => extract_pdf(tmp.path()),
        DocumentKind::Docx => extract_docx(tmp.path()),
    };

    debug!(
        "Extracted {} chars over {} page(s)",
        extracted.text.chars().count(),
        extracted.page_count
    );

    Ok(extracted)
}

fn write_temp_copy(bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new()?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    Ok(tmp)
}

/// PDF extraction: per-page text via lopdf, whole-document pdf-extract pass
/// as a fallback when no page yields text. No OCR; an image-only document
/// comes back as empty text with its real page count.
fn extract_pdf(path: &std::path::Path) -> ExtractedText {
    let doc = match Document::load(path) {
        Ok(d) => d,
        Err(e) => {
            warn!("Unreadable PDF container: {e}");
            return ExtractedText::recovered();
        }
    };

    let pages = doc.get_pages();
    let page_count = pages.len().max(1);

    let mut text = String::new();
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => {
                debug!("No text on page {page_num}: {e}");
            }
        }
    }

    if text.trim().is_empty() {
        match pdf_extract::extract_text(path) {
            Ok(fallback) => text = fallback,
            Err(e) => {
                debug!("Whole-document text pass failed: {e}");
            }
        }
    }

    ExtractedText { text, page_count }
}

/// DOCX extraction: streams `word/document.xml` out of the zip container.
/// Text is the concatenation of paragraph texts, one line per `w:p`; the
/// page count is the number of `w:sectPr` section markers, at least 1.
fn extract_docx(path: &std::path::Path) -> ExtractedText {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Unreadable DOCX temp copy: {e}");
            return ExtractedText::recovered();
        }
    };

    let mut archive = match zip::ZipArchive::new(file) {
        Ok(a) => a,
        Err(e) => {
            warn!("Unreadable DOCX container: {e}");
            return ExtractedText::recovered();
        }
    };

    let mut xml = String::new();
    match archive.by_name("word/document.xml") {
        Ok(mut entry) => {
            if let Err(e) = entry.read_to_string(&mut xml) {
                warn!("Unreadable document.xml: {e}");
                return ExtractedText::recovered();
            }
        }
        Err(e) => {
            warn!("DOCX has no word/document.xml: {e}");
            return ExtractedText::recovered();
        }
    }

    let (text, section_breaks) = parse_document_xml(&xml);
    ExtractedText {
        text,
        page_count: section_breaks.max(1),
    }
}

fn parse_document_xml(xml: &str) -> (String, usize) {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut section_breaks = 0usize;
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:sectPr" => section_breaks += 1,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"w:sectPr" {
                    section_breaks += 1;
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_text_run {
                    if let Ok(chunk) = t.unescape() {
                        text.push_str(&chunk);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Malformed document.xml, keeping partial text: {e}");
                break;
            }
        }
    }

    (text, section_breaks)
}
