pub mod types;
pub mod format;
pub mod pdf;
pub mod docx;
pub mod orchestrator;

pub use types::*;
pub use format::*;
pub use pdf::*;
pub use docx::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Unsupported file type")]
    UnsupportedFormat,

    #[error("Error extracting text: {0}")]
    ExtractionFailed(String),
}
