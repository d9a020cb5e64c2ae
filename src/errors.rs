//! Error types for rapid_textattack
//!
//! This module defines the error types used throughout the library.
//! Search outcomes (`Succeeded`, `Failed`, `Skipped`) are not errors; an
//! `AttackError` means the attack on one input could not complete at all.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AttackError>;

/// Main error type for rapid_textattack
#[derive(Error, Debug, Clone)]
pub enum AttackError {
    /// Input text is empty or contains no words
    #[error("Empty input: {message}")]
    EmptyInput { message: String },

    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The classification model failed to score a text
    #[error("Model failure: {message}")]
    Model { message: String },

    /// The linguistic tagger failed to tag a sentence
    #[error("Tagger failure: {message}")]
    Tagger { message: String },

    /// The nearest-neighbour lookup failed
    #[error("Neighbor lookup failure: {message}")]
    Neighbors { message: String },

    /// The model returned an empty label distribution
    #[error("Model returned an empty prediction for {text:?}")]
    EmptyPrediction { text: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Internal error (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AttackError {
    /// Create an empty input error
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a model failure error
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Create a tagger failure error
    pub fn tagger(message: impl Into<String>) -> Self {
        Self::Tagger {
            message: message.into(),
        }
    }

    /// Create a neighbor lookup failure error
    pub fn neighbors(message: impl Into<String>) -> Self {
        Self::Neighbors {
            message: message.into(),
        }
    }

    /// Create an empty prediction error
    pub fn empty_prediction(text: impl Into<String>) -> Self {
        Self::EmptyPrediction { text: text.into() }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error was raised by an external collaborator
    /// (model, tagger, or neighbor lookup) rather than by the caller's input.
    pub fn is_collaborator_fault(&self) -> bool {
        matches!(
            self,
            Self::Model { .. }
                | Self::Tagger { .. }
                | Self::Neighbors { .. }
                | Self::EmptyPrediction { .. }
        )
    }
}

impl From<serde_json::Error> for AttackError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
