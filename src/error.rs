//! Error types for cosmosim
//!
//! Library code returns `SimResult<T>`; the binary wraps these in `anyhow`.

use thiserror::Error;

/// Result alias used across the library
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    /// Scenario definition failed validation (bad type, empty objects/steps)
    #[error("malformed scenario: {message}")]
    MalformedScenario { message: String },

    /// Body construction rejected (non-positive or non-finite mass/radius)
    #[error("invalid body '{name}': {message}")]
    InvalidBody { name: String, message: String },

    /// NaN or infinity detected where a finite value is required
    #[error("non-finite value detected at {location}")]
    NonFiniteValue { location: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedScenario {
            message: message.into(),
        }
    }

    pub fn invalid_body(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBody {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn non_finite(location: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            location: location.into(),
        }
    }
}
