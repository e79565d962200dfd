use std::cell::RefCell;

use super::types::{FragmentStream, GenerationConfig, GenerativeModel, TextFragment};
use super::GenerationError;

/// Model that replays a fixed script (for testing and offline demos).
///
/// Yields each scripted fragment in order, then the scripted failure if one
/// is set. Every call is recorded so tests can inspect the prompt and the
/// config that reached the model.
pub struct ScriptedModel {
    fragments: Vec<String>,
    failure: Option<GenerationError>,
    start_failure: Option<GenerationError>,
    calls: RefCell<Vec<(String, GenerationConfig)>>,
}

impl ScriptedModel {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: None,
            start_failure: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Fail after the scripted fragments have been yielded.
    pub fn failing_with(mut self, error: GenerationError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Fail the call itself, before any fragment.
    pub fn refusing_with(mut self, error: GenerationError) -> Self {
        self.start_failure = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<(String, GenerationConfig)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl GenerativeModel for ScriptedModel {
    fn stream_generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<FragmentStream<'_>, GenerationError> {
        self.calls.borrow_mut().push((prompt.to_string(), *config));

        if let Some(error) = &self.start_failure {
            return Err(error.clone());
        }

        let fragments = self
            .fragments
            .iter()
            .enumerate()
            .map(|(index, text)| {
                Ok(TextFragment {
                    index,
                    text: text.clone(),
                })
            });
        let failure = self.failure.clone().map(Err);

        Ok(Box::new(fragments.chain(failure)))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
