pub mod extraction;
pub mod prompt;
pub mod generation;
pub mod processor;
