//! Error types for the handmap engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Mapping already registered: {id}")]
    DuplicateMapping { id: String },

    #[error("Unknown mapping: {id}")]
    UnknownMapping { id: String },

    #[error("Landmark count mismatch: expected {expected}, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn duplicate(id: impl Into<String>) -> Self {
        Error::DuplicateMapping { id: id.into() }
    }

    pub fn unknown(id: impl Into<String>) -> Self {
        Error::UnknownMapping { id: id.into() }
    }
}
