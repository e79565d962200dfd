use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::format::detect_format;
use super::ExtractionError;

/// Declared format of an upload, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatTag {
    Pdf,
    Docx,
    Unsupported,
}

impl FormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// A user upload awaiting extraction. Consumed once, never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Log correlation only.
    pub id: Uuid,
    pub file_name: String,
    pub format: FormatTag,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Wrap raw upload bytes, tagging the format from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let format = detect_format(&file_name);
        Self {
            id: Uuid::new_v4(),
            file_name,
            format,
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Structural unit joined to form the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextUnit {
    Page,
    Paragraph,
}

/// Plain text recovered from a document.
///
/// `text` is every unit joined by a single `\n`, so a document with N
/// units always carries N-1 separators. Units without text contribute an
/// empty string rather than being dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub unit: TextUnit,
    pub unit_count: usize,
}

impl ExtractedText {
    pub fn from_units(unit: TextUnit, units: Vec<String>) -> Self {
        Self {
            unit_count: units.len(),
            text: units.join("\n"),
            unit,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Per-page text from a PDF, in page order.
pub trait PdfTextSource {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Per-paragraph text from a DOCX body, in document order.
pub trait DocxTextSource {
    fn paragraph_texts(&self, docx_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}
