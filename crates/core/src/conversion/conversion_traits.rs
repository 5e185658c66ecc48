use super::conversion_model::{
    ChangeDirection, ExchangePrefill, PromptResponse, RateRequest, ResolutionOutcome,
};
use crate::decimal::FixedPointDecimal;
use crate::errors::Result;

/// Access to the transaction records the resolver reads and updates.
pub trait TransactionStoreTrait: Send + Sync {
    fn get_transaction_currency(&self, transaction_id: &str) -> Result<String>;
    fn get_account_currency_for_transaction(&self, transaction_id: &str) -> Result<String>;
    fn set_exchange_rate(&self, transaction_id: &str, rate: FixedPointDecimal) -> Result<()>;
    fn set_exchange_fees(&self, transaction_id: &str, fees: FixedPointDecimal) -> Result<()>;
    fn set_change_direction(&self, transaction_id: &str, direction: ChangeDirection)
        -> Result<()>;
}

/// The interactive exchange rate dialog. `ask` blocks until the user
/// confirms or cancels.
pub trait RatePromptTrait: Send + Sync {
    fn ask(&self, request: &RateRequest) -> PromptResponse;
}

/// Currency display names, only used to build messages.
pub trait CurrencyMetadataTrait: Send + Sync {
    fn currency_name(&self, currency: &str) -> Option<String>;
}

/// Metadata provider that knows no names and falls back to the identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrencyCodeMetadata;

impl CurrencyMetadataTrait for CurrencyCodeMetadata {
    fn currency_name(&self, _currency: &str) -> Option<String> {
        None
    }
}

/// Trait defining the contract for conversion resolution.
pub trait ConversionServiceTrait: Send + Sync {
    fn resolve(&self, transaction_id: &str, force: bool) -> Result<ResolutionOutcome>;
    fn prompt_exchange(
        &self,
        account_currency: &str,
        transaction_currency: &str,
        prefill: ExchangePrefill,
        force: bool,
    ) -> Result<(FixedPointDecimal, FixedPointDecimal)>;
    fn reset_session(&self) -> Result<()>;
    fn init_exchanges(&self) -> Result<()>;
    fn current_exchange(&self) -> Result<FixedPointDecimal>;
    fn current_exchange_fees(&self) -> Result<FixedPointDecimal>;
    fn set_current_exchange(&self, rate: FixedPointDecimal) -> Result<()>;
    fn set_current_exchange_fees(&self, fees: FixedPointDecimal) -> Result<()>;
}
