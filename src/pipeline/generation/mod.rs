pub mod types;
pub mod gemini_types;
pub mod gemini;
pub mod mock;
pub mod relay;

pub use types::*;
pub use gemini::*;
pub use mock::*;
pub use relay::*;

use thiserror::Error;

/// Why a generation call failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation service unreachable at {0}")]
    Connection(String),

    #[error("Generation service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Response blocked by the service: {0}")]
    Blocked(String),

    #[error("Stream interrupted: {0}")]
    Stream(String),
}
