use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemeError {
    #[error("No usable color samples: visited {visited} pixels, none survived filtering")]
    InsufficientColorData { visited: usize },

    #[error("Expected 1 to 3 seed colors, got {0}")]
    InvalidSeedCount(usize),

    #[error("Pixel buffer holds {actual} bytes, expected {expected} (width * height * 4)")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),

    #[error("{variant}/{role}: contrast {achieved:.2}:1 is below the {target:.2}:1 target")]
    UnreachableContrastTarget {
        variant: String,
        role: String,
        target: f64,
        achieved: f64,
    },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemeError>;

impl SchemeError {
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Conditions a caller can work around (manual seeds, relaxed targets)
    /// rather than programming errors.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SchemeError::InsufficientColorData { .. } | SchemeError::UnreachableContrastTarget { .. }
        )
    }
}

