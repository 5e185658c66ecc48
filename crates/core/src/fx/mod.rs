//! FX module - currency links, the session exchange rate cache, and their errors.

mod currency_link_model;
mod currency_link_registry;
mod exchange_rate_cache;
mod fx_errors;

pub use currency_link_model::{CurrencyLink, LinkId, MatchedSide};
pub use currency_link_registry::CurrencyLinkRegistry;
pub use exchange_rate_cache::{CachedExchangeRate, ExchangeRateCache};
pub use fx_errors::FxError;
