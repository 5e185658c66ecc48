use thiserror::Error;

/// Errors raised while resolving the exchange rate of a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The entered or derived rate is zero. Recovered by re-prompting.
    #[error("The exchange rate must not be zero")]
    InvalidRate,

    /// A rate was derived from a zero account-currency amount. Recovered by re-prompting.
    #[error("Cannot derive a rate from a zero amount")]
    DivisionByZero,

    /// The user cancelled the rate prompt.
    #[error("Resolution aborted by the user")]
    ResolutionAborted,

    #[error("Currency is missing for {0}")]
    MissingCurrency(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
}
