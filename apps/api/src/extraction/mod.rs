//! Document text extraction for uploaded resumes (PDF and DOCX).

use bytes::Bytes;
use thiserror::Error;

mod docx;
mod pdf;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("Document contains no extractable text")]
    EmptyDocument,

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Determines the format from the text after the last `.` in the filename,
    /// compared case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractionError::UnsupportedFormat(extension)),
        }
    }
}

/// A resume file as received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn format(&self) -> Result<DocumentFormat, ExtractionError> {
        DocumentFormat::from_filename(&self.filename)
    }
}

/// Extracts plain text from document bytes. The result is never blank.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = match format {
        DocumentFormat::Pdf => pdf::extract_pdf_text(bytes)?,
        DocumentFormat::Docx => docx::extract_docx_text(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }
    Ok(text)
}

/// Runs extraction on the blocking pool; PDF parsing is CPU-bound.
pub async fn extract_document(document: UploadedDocument) -> Result<String, ExtractionError> {
    let format = document.format()?;
    tokio::task::spawn_blocking(move || extract_text(format, &document.bytes)).await?
}
