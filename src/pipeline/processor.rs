//! Guide pipeline: extract → compose → generate.
//!
//! Holds the extractor and a borrowed generative model so the same
//! pipeline runs against Gemini in production and a scripted model in
//! tests.

use crate::pipeline::extraction::{DocumentExtractor, ExtractedText, ExtractionError, UploadedDocument};
use crate::pipeline::generation::{
    GenerationError, GenerationFailed, GenerativeModel, ResponseStream, StreamRelay,
    StreamedOutput,
};
use crate::pipeline::prompt::{
    compose_from_selections, ComposedPrompt, GenerationSelections, ValidationError,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Any failure of a full pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationFailed),
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct GuidePipeline<'a, M: GenerativeModel> {
    extractor: DocumentExtractor,
    model: &'a M,
}

impl<'a, M: GenerativeModel> GuidePipeline<'a, M> {
    pub fn new(extractor: DocumentExtractor, model: &'a M) -> Self {
        Self { extractor, model }
    }

    /// Pipeline with the production PDF/DOCX backends.
    pub fn with_model(model: &'a M) -> Self {
        Self::new(DocumentExtractor::default(), model)
    }

    pub fn extractor(&self) -> &DocumentExtractor {
        &self.extractor
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn extract(&self, document: &UploadedDocument) -> Result<ExtractedText, ExtractionError> {
        self.extractor.extract(document)
    }

    /// Extract from a named upload, detecting the format from the name.
    pub fn extract_upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ExtractedText, ExtractionError> {
        let document = UploadedDocument::new(file_name, bytes);
        self.extract(&document)
    }

    pub fn compose(
        &self,
        text: &str,
        selections: &GenerationSelections,
    ) -> Result<ComposedPrompt, ValidationError> {
        compose_from_selections(text, selections)
    }

    /// Open a lazy response stream for an already composed prompt.
    pub fn generate(
        &self,
        prompt: &ComposedPrompt,
        creativity: f32,
    ) -> Result<ResponseStream<'a>, GenerationError> {
        StreamRelay::new(self.model).generate(prompt, creativity)
    }

    /// Validate, compose and relay in one call.
    ///
    /// Validation failures happen before the model is contacted.
    pub fn run<F>(
        &self,
        text: &str,
        selections: &GenerationSelections,
        publish: F,
    ) -> Result<StreamedOutput, GuideError>
    where
        F: FnMut(&StreamedOutput),
    {
        let prompt = self.compose(text, selections)?;
        let output = StreamRelay::new(self.model).relay(&prompt, selections.creativity, publish)?;
        Ok(output)
    }
}
