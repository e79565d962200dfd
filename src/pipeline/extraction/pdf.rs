use super::types::PdfTextSource;
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Reads the embedded text layer page by page; scanned pages come back empty.
pub struct PdfTextExtractor;

impl PdfTextSource for PdfTextExtractor {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        // pdf-extract panics on some malformed font and encoding tables
        let outcome = std::panic::catch_unwind(|| {
            pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        });
        let page_texts = match outcome {
            Ok(result) => result.map_err(|e| ExtractionError::ExtractionFailed(e.to_string()))?,
            Err(_) => {
                return Err(ExtractionError::ExtractionFailed(
                    "PDF parser aborted on malformed content".into(),
                ))
            }
        };

        // pdf-extract pads each page with blank lines
        Ok(page_texts
            .into_iter()
            .map(|text| text.trim().to_string())
            .collect())
    }
}
