//! Document text extraction for uploaded résumés (PDF, DOCX and plain text).

use std::collections::HashSet;
use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detects the format from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("text file is not valid UTF-8")]
    InvalidEncoding,

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("could not read DOCX: {0}")]
    Docx(String),

    #[error("document contains no extractable text")]
    EmptyDocument,
}

/// Extracts trimmed text from a document. PDF and DOCX parsing run on a
/// blocking thread; a panic inside either reader surfaces as that format's error.
pub async fn extract_text(
    bytes: bytes::Bytes,
    format: DocumentFormat,
) -> Result<String, ExtractionError> {
    let text = match format {
        DocumentFormat::Txt => String::from_utf8(bytes.to_vec())
            .map_err(|_| ExtractionError::InvalidEncoding)?,
        DocumentFormat::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?
        .map_err(ExtractionError::Pdf)?,
        DocumentFormat::Docx => tokio::task::spawn_blocking(move || docx_text(&bytes))
            .await
            .map_err(|e| ExtractionError::Docx(e.to_string()))??,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }
    debug!("Extracted {} chars from {:?} document", text.len(), format);
    Ok(text.to_string())
}

/// Reads `word/document.xml` out of the DOCX archive.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(docx_error)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(docx_error)?
        .read_to_string(&mut xml)
        .map_err(docx_error)?;

    document_xml_text(&xml)
}

fn docx_error(err: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Docx(err.to_string())
}

/// Collects `<w:t>` run text, one line per `<w:p>` paragraph.
fn document_xml_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        let event = reader.read_event().map_err(docx_error)?;
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let run = t.unescape().map_err(docx_error)?;
                text.push_str(&run);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Submission id for an uploaded file: its stem, suffixed `-2`, `-3`, … when
/// an earlier file in the same batch already claimed it.
pub fn unique_submission_id(file_name: &str, taken: &mut HashSet<String>) -> String {
    let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = match base_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base_name,
    };
    let stem = if stem.trim().is_empty() { "resume" } else { stem.trim() };

    let mut candidate = stem.to_string();
    let mut suffix = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{stem}-{suffix}");
        suffix += 1;
    }
    candidate
}
