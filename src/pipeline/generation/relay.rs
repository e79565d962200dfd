use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::types::{FragmentStream, GenerationConfig, GenerativeModel, TextFragment};
use super::GenerationError;
use crate::pipeline::prompt::ComposedPrompt;

/// Running output of one generation call.
///
/// Append-only for the lifetime of the call. A new call starts from a fresh
/// value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamedOutput {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub fragments: Vec<TextFragment>,
    text: String,
}

impl StreamedOutput {
    pub fn begin() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            fragments: Vec::new(),
            text: String::new(),
        }
    }

    fn push(&mut self, fragment: TextFragment) {
        self.text.push_str(&fragment.text);
        self.fragments.push(fragment);
    }

    /// Concatenation of every fragment so far, in arrival order.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

/// Generation ended in failure. `partial` holds whatever arrived first.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Error generating response: {reason}")]
pub struct GenerationFailed {
    pub reason: GenerationError,
    pub partial: StreamedOutput,
}

// ═══════════════════════════════════════════════════════════
// ResponseStream
// ═══════════════════════════════════════════════════════════

/// Lazy, single-pass view of one generation call.
///
/// Each fragment pulled from the model is appended to `output()` before it
/// is handed to the caller. Iteration stops after the first error.
pub struct ResponseStream<'a> {
    fragments: FragmentStream<'a>,
    output: StreamedOutput,
    finished: bool,
}

impl<'a> ResponseStream<'a> {
    pub fn output(&self) -> &StreamedOutput {
        &self.output
    }

    pub fn into_output(self) -> StreamedOutput {
        self.output
    }
}

impl Iterator for ResponseStream<'_> {
    type Item = Result<TextFragment, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.fragments.next() {
            Some(Ok(fragment)) => {
                self.output.push(fragment.clone());
                Some(Ok(fragment))
            }
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// StreamRelay
// ═══════════════════════════════════════════════════════════

/// Forwards composed prompts to a generative model and accumulates the
/// streamed reply.
pub struct StreamRelay<'a, M: GenerativeModel> {
    model: &'a M,
}

impl<'a, M: GenerativeModel> StreamRelay<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Open a streaming call. Creativity goes to the model unchanged as the
    /// temperature. Nothing is retried.
    pub fn generate(
        &self,
        prompt: &ComposedPrompt,
        creativity: f32,
    ) -> Result<ResponseStream<'a>, GenerationError> {
        self.open(prompt, creativity, StreamedOutput::begin())
    }

    fn open(
        &self,
        prompt: &ComposedPrompt,
        creativity: f32,
        output: StreamedOutput,
    ) -> Result<ResponseStream<'a>, GenerationError> {
        let model: &'a M = self.model;
        let config = GenerationConfig::with_creativity(creativity);

        tracing::info!(
            run_id = %output.run_id,
            model = model.model_name(),
            prompt_length = prompt.len(),
            temperature = config.temperature,
            "Starting generation"
        );

        let fragments = model.stream_generate(prompt.as_str(), &config)?;
        Ok(ResponseStream {
            fragments,
            output,
            finished: false,
        })
    }

    /// Drive a call to completion, calling `publish` with the whole buffer
    /// after every fragment.
    ///
    /// On failure the fragments received so far are returned inside
    /// `GenerationFailed` so they can stay on screen.
    pub fn relay<F>(
        &self,
        prompt: &ComposedPrompt,
        creativity: f32,
        mut publish: F,
    ) -> Result<StreamedOutput, GenerationFailed>
    where
        F: FnMut(&StreamedOutput),
    {
        let output = StreamedOutput::begin();
        let run_id = output.run_id;

        let mut stream = match self.open(prompt, creativity, output.clone()) {
            Ok(stream) => stream,
            Err(reason) => {
                tracing::error!(run_id = %run_id, error = %reason, "Generation call failed");
                return Err(GenerationFailed {
                    reason,
                    partial: output,
                });
            }
        };

        while let Some(item) = stream.next() {
            match item {
                Ok(_) => publish(stream.output()),
                Err(reason) => {
                    let partial = stream.into_output();
                    tracing::error!(
                        run_id = %run_id,
                        fragments = partial.fragment_count(),
                        error = %reason,
                        "Generation stream failed"
                    );
                    return Err(GenerationFailed { reason, partial });
                }
            }
        }

        let output = stream.into_output();
        tracing::info!(
            run_id = %run_id,
            fragments = output.fragment_count(),
            output_length = output.text().len(),
            "Generation complete"
        );
        Ok(output)
    }
}
