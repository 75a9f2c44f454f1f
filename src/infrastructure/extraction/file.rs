use std::io::{Cursor, Read};

use lopdf::Document as PdfDocument;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::{DomainError, FileKind};

/// Plain text for an uploaded file, chosen by its extension.
pub fn extract_file(kind: FileKind, bytes: &[u8]) -> Result<String, DomainError> {
    match kind {
        FileKind::Pdf => extract_pdf(bytes),
        FileKind::Docx => extract_docx(bytes),
        FileKind::Text | FileKind::Unknown => Ok(decode_lossy(bytes)),
    }
}

/// Invalid UTF-8 sequences become U+FFFD instead of failing the upload.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Page texts joined by newlines. A page whose text cannot be extracted
/// contributes an empty line; only an unreadable file is an error.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, DomainError> {
    let document = PdfDocument::load_mem(bytes)
        .map_err(|e| DomainError::extraction(format!("invalid PDF: {e}")))?;

    let pages: Vec<String> = document
        .get_pages()
        .keys()
        .map(|&page| {
            document.extract_text(&[page]).unwrap_or_else(|e| {
                tracing::debug!(page, error = %e, "no text extracted from page");
                String::new()
            })
        })
        .collect();

    Ok(pages.join("\n"))
}

const DOCX_BODY: &str = "word/document.xml";

/// Paragraph texts of a `.docx` file joined by newlines.
pub fn extract_docx(bytes: &[u8]) -> Result<String, DomainError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DomainError::extraction(format!("invalid DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| DomainError::extraction(format!("DOCX has no {DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DomainError::extraction(format!("unreadable {DOCX_BODY}: {e}")))?;

    Ok(docx_paragraphs(&xml)?.join("\n"))
}

fn docx_paragraphs(xml: &str) -> Result<Vec<String>, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => current.get_or_insert_with(String::new).push('\t'),
                b"w:br" | b"w:cr" => current.get_or_insert_with(String::new).push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => paragraphs.extend(current.take()),
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let text = text
                    .unescape()
                    .map_err(|e| DomainError::extraction(format!("malformed DOCX text: {e}")))?;
                current.get_or_insert_with(String::new).push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DomainError::extraction(format!(
                    "malformed DOCX xml at {}: {e}",
                    reader.error_position()
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
