//! Core error types for the conversion engine.
//!
//! Each module owns a focused error enum; this module folds them into one
//! root type so collaborators and callers share a single `Result`.

use thiserror::Error;

use crate::conversion::ConversionError;
use crate::decimal::DecimalError;
use crate::fx::FxError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the conversion engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Decimal arithmetic failed: {0}")]
    Decimal(#[from] DecimalError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the user cancelled an interactive rate prompt.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Conversion(ConversionError::ResolutionAborted))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
