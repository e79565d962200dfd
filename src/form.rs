//! Symptom form state.
//!
//! Models the single-page form: an editable symptom field pre-filled by
//! uploads, the appointment type, three section toggles, the creativity
//! slider and the streamed output area. Every pipeline failure becomes a
//! `Notice`; nothing here aborts the process.

use std::fmt;

use serde::Serialize;

use crate::pipeline::extraction::{DocumentExtractor, ExtractionError, UploadedDocument};
use crate::pipeline::generation::GenerativeModel;
use crate::pipeline::processor::{GuideError, GuidePipeline};
use crate::pipeline::prompt::{
    compose_from_selections, validate_creativity, Category, ComposedPrompt, GenerationSelections,
    Section,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// User-facing message produced from a failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Warning => write!(f, "warning: {}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

impl From<&GuideError> for Notice {
    fn from(err: &GuideError) -> Self {
        match err {
            GuideError::Extraction(ExtractionError::UnsupportedFormat) => Self::warning(err.to_string()),
            GuideError::Extraction(_) => Self::error(err.to_string()),
            GuideError::Validation(_) => Self::warning(err.to_string()),
            GuideError::Generation(_) => Self::error(err.to_string()),
        }
    }
}

impl From<GuideError> for Notice {
    fn from(err: GuideError) -> Self {
        Self::from(&err)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SymptomForm {
    /// Editable symptom text. Authoritative at submit time.
    pub text: String,
    pub selections: GenerationSelections,
    output: String,
}

impl SymptomForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an uploaded document into the symptom field.
    ///
    /// On failure the field is cleared and the notice returned.
    pub fn upload(
        &mut self,
        extractor: &DocumentExtractor,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), Notice> {
        match extractor.extract(&UploadedDocument::new(file_name, bytes)) {
            Ok(extracted) => {
                self.text = extracted.text;
                Ok(())
            }
            Err(e) => {
                self.text.clear();
                Err(GuideError::from(e).into())
            }
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_category(&mut self, category: Category) {
        self.selections.category = category;
    }

    pub fn set_section(&mut self, section: Section, enabled: bool) {
        if enabled {
            self.selections.sections.insert(section);
        } else {
            self.selections.sections.remove(&section);
        }
    }

    /// Slider setter. Out-of-range values are refused and the old value kept.
    pub fn set_creativity(&mut self, creativity: f32) -> Result<(), Notice> {
        validate_creativity(creativity).map_err(|e| Notice::warning(e.to_string()))?;
        self.selections.creativity = creativity;
        Ok(())
    }

    /// Prompt the current field values would produce, without submitting.
    pub fn compose(&self) -> Result<ComposedPrompt, Notice> {
        compose_from_selections(&self.text, &self.selections)
            .map_err(|e| GuideError::from(e).into())
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Validate, compose and stream. `publish` receives the whole output
    /// buffer after every fragment.
    ///
    /// The output area is cleared first. On a generation failure it keeps
    /// the fragments that arrived before the failure.
    pub fn submit<M, F>(&mut self, pipeline: &GuidePipeline<'_, M>, mut publish: F) -> Result<(), Notice>
    where
        M: GenerativeModel,
        F: FnMut(&str),
    {
        self.output.clear();

        match pipeline.run(&self.text, &self.selections, |out| publish(out.text())) {
            Ok(output) => {
                self.output = output.text().to_string();
                Ok(())
            }
            Err(e) => {
                if let GuideError::Generation(failed) = &e {
                    self.output = failed.partial.text().to_string();
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::pdf::tests::make_test_pdf;
    use crate::pipeline::generation::{GenerationError, ScriptedModel};

    #[test]
    fn unsupported_upload_warns_and_clears_text() {
        let mut form = SymptomForm::new();
        form.set_text("previous notes");

        let notice = form.upload(&DocumentExtractor::default(), "notes.txt", b"fever".to_vec()).unwrap_err();
        assert_eq!(notice, Notice::warning("Unsupported file type"));
        assert_eq!(form.text, "");
    }

    #[test]
    fn corrupt_upload_is_error_notice() {
        let mut form = SymptomForm::new();

        let notice = form.upload(&DocumentExtractor::default(), "scan.pdf", b"not a pdf".to_vec()).unwrap_err();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.starts_with("Error extracting text:"));
        assert_eq!(form.text, "");
    }

    #[test]
    fn pdf_upload_prefills_editable_text() {
        let model = ScriptedModel::new(&["ok"]);
        let pipeline = GuidePipeline::with_model(&model);
        let mut form = SymptomForm::new();

        form.upload(pipeline.extractor(), "visit.PDF", make_test_pdf(&["Headache", "Nausea"]))
            .unwrap();
        assert_eq!(form.text.matches('\n').count(), 1);
        assert!(form.text.contains("Headache") || form.text.contains("Nausea"));

        form.set_text("Headache for three days");
        form.submit(&pipeline, |_| {}).unwrap();
        assert!(model.calls()[0].0.contains("Their symptoms are: Headache for three days\n"));
    }

    #[test]
    fn empty_text_warns_without_calling_model() {
        let model = ScriptedModel::new(&["unused"]);
        let pipeline = GuidePipeline::with_model(&model);
        let mut form = SymptomForm::new();

        let notice = form.submit(&pipeline, |_| {}).unwrap_err();
        assert_eq!(
            notice,
            Notice::warning("Please fill out both Medical Information and Appointment Type")
        );
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn all_toggles_off_warns() {
        let model = ScriptedModel::new(&["unused"]);
        let pipeline = GuidePipeline::with_model(&model);
        let mut form = SymptomForm::new();
        form.set_text("fever");
        for section in Section::all() {
            form.set_section(*section, false);
        }

        let notice = form.submit(&pipeline, |_| {}).unwrap_err();
        assert_eq!(notice, Notice::warning("Please select at least one generation option"));
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn streams_into_output_area() {
        let model = ScriptedModel::new(&["### 📝 Summary Sheet", "\n- fever"]);
        let pipeline = GuidePipeline::with_model(&model);
        let mut form = SymptomForm::new();
        form.set_text("fever");
        form.set_category(Category::Pediatrician);
        form.set_creativity(0.3).unwrap();

        let mut frames = Vec::new();
        form.submit(&pipeline, |buffer| frames.push(buffer.to_string()))
            .unwrap();

        assert_eq!(frames, vec!["### 📝 Summary Sheet", "### 📝 Summary Sheet\n- fever"]);
        assert_eq!(form.output(), "### 📝 Summary Sheet\n- fever");
        let calls = model.calls();
        assert_eq!(calls[0].1.temperature, 0.3);
        assert!(calls[0].0.contains("**Pediatrician**"));
    }

    #[test]
    fn failure_mid_stream_keeps_partial_output() {
        let model = ScriptedModel::new(&["A", "B"])
            .failing_with(GenerationError::Stream("connection reset".into()));
        let pipeline = GuidePipeline::with_model(&model);
        let mut form = SymptomForm::new();
        form.set_text("fever");

        let notice = form.submit(&pipeline, |_| {}).unwrap_err();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.starts_with("Error generating response:"));
        assert_eq!(form.output(), "AB");
    }

    #[test]
    fn new_submit_resets_output() {
        let failing = ScriptedModel::new(&["stale"])
            .failing_with(GenerationError::Stream("reset".into()));
        let mut form = SymptomForm::new();
        form.set_text("fever");
        let _ = form.submit(&GuidePipeline::with_model(&failing), |_| {});
        assert_eq!(form.output(), "stale");

        let refusing = ScriptedModel::new(&[])
            .refusing_with(GenerationError::Connection("http://127.0.0.1:9".into()));
        let _ = form.submit(&GuidePipeline::with_model(&refusing), |_| {});
        assert_eq!(form.output(), "");
    }

    #[test]
    fn compose_previews_prompt() {
        let mut form = SymptomForm::new();
        assert_eq!(
            form.compose().unwrap_err(),
            Notice::warning("Please fill out both Medical Information and Appointment Type")
        );

        form.set_text("itchy rash");
        form.set_category(Category::Dermatologist);
        form.set_section(Section::Explanation, false);
        let prompt = form.compose().unwrap();
        assert!(prompt.as_str().contains("**Dermatologist**"));
        assert!(!prompt.as_str().contains("Explain Symptoms"));
    }

    #[test]
    fn creativity_out_of_range_refused() {
        let mut form = SymptomForm::new();
        let notice = form.set_creativity(1.2).unwrap_err();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(form.selections.creativity, 0.7);
    }

    #[test]
    fn notice_display_carries_level() {
        assert_eq!(Notice::warning("Unsupported file type").to_string(), "warning: Unsupported file type");
        assert_eq!(Notice::error("boom").to_string(), "error: boom");
    }

    #[test]
    fn toggles_update_sections() {
        let mut form = SymptomForm::new();
        form.set_section(Section::Questions, false);
        assert!(!form.selections.sections.contains(&Section::Questions));
        form.set_section(Section::Questions, true);
        assert_eq!(form.selections.sections.len(), 3);
    }
}
