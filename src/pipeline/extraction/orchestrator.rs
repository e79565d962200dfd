use super::docx::DocxParagraphExtractor;
use super::format::check_upload_size;
use super::pdf::PdfTextExtractor;
use super::types::{
    DocxTextSource, ExtractedText, FormatTag, PdfTextSource, TextUnit, UploadedDocument,
};
use super::ExtractionError;

/// Concrete implementation of the text extractor.
/// Uses trait objects for the PDF and DOCX backends, enabling dependency injection.
pub struct DocumentExtractor {
    pdf_source: Box<dyn PdfTextSource + Send + Sync>,
    docx_source: Box<dyn DocxTextSource + Send + Sync>,
}

impl DocumentExtractor {
    pub fn new(
        pdf_source: Box<dyn PdfTextSource + Send + Sync>,
        docx_source: Box<dyn DocxTextSource + Send + Sync>,
    ) -> Self {
        Self {
            pdf_source,
            docx_source,
        }
    }

    /// Extract plain text from an upload.
    ///
    /// Unsupported formats are rejected before any parsing. Parser failures
    /// come back as `ExtractionFailed`; nothing here panics on bad input.
    pub fn extract(&self, document: &UploadedDocument) -> Result<ExtractedText, ExtractionError> {
        tracing::info!(
            document_id = %document.id,
            format = document.format.as_str(),
            size_bytes = document.size_bytes(),
            "Starting text extraction"
        );

        if !document.format.is_supported() {
            tracing::warn!(document_id = %document.id, "Unsupported file type, extraction skipped");
            return Err(ExtractionError::UnsupportedFormat);
        }

        check_upload_size(document.size_bytes())?;

        let result = match document.format {
            FormatTag::Pdf => self
                .pdf_source
                .page_texts(&document.bytes)
                .map(|pages| ExtractedText::from_units(TextUnit::Page, pages)),
            FormatTag::Docx => self
                .docx_source
                .paragraph_texts(&document.bytes)
                .map(|paragraphs| ExtractedText::from_units(TextUnit::Paragraph, paragraphs)),
            FormatTag::Unsupported => Err(ExtractionError::UnsupportedFormat),
        };

        match &result {
            Ok(extracted) => tracing::info!(
                document_id = %document.id,
                units = extracted.unit_count,
                text_length = extracted.text.len(),
                "Text extraction complete"
            ),
            Err(e) => tracing::error!(
                document_id = %document.id,
                error = %e,
                "Text extraction failed"
            ),
        }

        result
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(Box::new(PdfTextExtractor), Box::new(DocxParagraphExtractor))
    }
}
