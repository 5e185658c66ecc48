use thiserror::Error;

/// Errors raised by fixed-point decimal arithmetic and parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Failed to parse decimal '{input}': {reason}")]
    Parse { input: String, reason: String },
}
