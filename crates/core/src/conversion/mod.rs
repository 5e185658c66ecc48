//! Conversion module - resolves the exchange rate of foreign-currency transactions.

mod conversion_errors;
mod conversion_model;
mod conversion_service;
mod conversion_traits;


pub use conversion_errors::ConversionError;
pub use conversion_model::{
    ChangeDirection, ConversionSessionState, ExchangePrefill, LinkContext, PromptResponse,
    RateEntry, RateInput, RateRequest, RateSource, ResolutionOutcome,
};
pub use conversion_service::ConversionService;
pub use conversion_traits::{
    ConversionServiceTrait, CurrencyCodeMetadata, CurrencyMetadataTrait, RatePromptTrait,
    TransactionStoreTrait,
};
