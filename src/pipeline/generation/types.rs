use serde::Serialize;

use super::GenerationError;

/// Options forwarded to the external model. `temperature` is the user's
/// creativity value, passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

impl GenerationConfig {
    pub fn with_creativity(creativity: f32) -> Self {
        Self {
            temperature: creativity,
        }
    }
}

/// One incremental chunk of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFragment {
    /// Arrival position within the stream, starting at 0.
    pub index: usize,
    pub text: String,
}

/// Finite, ordered, single-pass sequence of fragments from one call.
///
/// An `Err` item ends the stream; sources yield nothing after it.
pub type FragmentStream<'a> = Box<dyn Iterator<Item = Result<TextFragment, GenerationError>> + 'a>;

/// External generation capability (allows mocking).
pub trait GenerativeModel {
    /// Start a streaming generation.
    ///
    /// Returns `Err` when the call fails before any fragment is available
    /// (connection refused, bad credentials, rejected request).
    fn stream_generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<FragmentStream<'_>, GenerationError>;

    /// Human-readable model name, for logs.
    fn model_name(&self) -> &str;
}
