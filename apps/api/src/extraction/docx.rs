use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";
const WORDPROCESSING_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Extracts paragraph text from a DOCX container, one paragraph per line.
pub(super) fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| ExtractionError::Docx(format!("missing {DOCUMENT_PART}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    Ok(paragraphs_from_xml(&xml)?.join("\n"))
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = NsReader::from_str(xml);

    let mut paragraphs = Vec::new();
    // Paragraphs nest inside text boxes, so track them as a stack.
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;
    // Tabs and breaks only count inside runs; `w:pPr/w:tabs` holds tab stops.
    let mut run_depth = 0usize;

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) if is_word(&ns) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            Ok((ns, Event::Empty(e))) if is_word(&ns) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if run_depth > 0 => push_to_open(&mut open, "\t"),
                b"br" | b"cr" if run_depth > 0 => push_to_open(&mut open, "\n"),
                _ => {}
            },
            Ok((_, Event::Text(e))) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractionError::Docx(format!("XML decode error: {err}")))?;
                push_to_open(&mut open, &text);
            }
            Ok((ns, Event::End(e))) if is_word(&ns) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Ok((_, Event::Eof)) => break,
            Err(e) => {
                return Err(ExtractionError::Docx(format!(
                    "XML parsing error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn is_word(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == WORDPROCESSING_NS)
}

fn push_to_open(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}
