pub mod types;
pub mod templates;
pub mod composer;

pub use types::*;
pub use composer::*;

use thiserror::Error;

/// Pre-flight failures. Raised before any external call is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill out both Medical Information and Appointment Type")]
    MissingInput,

    #[error("Please select at least one generation option")]
    NoSectionsSelected,

    #[error("Creativity must be between 0.0 and 1.0, got {0}")]
    CreativityOutOfRange(f32),

    #[error("Unknown appointment type: {0}")]
    UnknownCategory(String),

    #[error("Unknown output section: {0}")]
    UnknownSection(String),
}
