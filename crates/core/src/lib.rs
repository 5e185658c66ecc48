//! fxlink Core - exchange rate resolution for foreign-currency transactions.
//!
//! This crate decides which exchange rate and fees apply to a transaction
//! recorded in a currency other than its account's. It is UI-agnostic: the
//! transaction store, the rate prompt and currency names are traits
//! implemented by the host application.

pub mod constants;
pub mod conversion;
pub mod decimal;
pub mod errors;
pub mod fx;
pub mod settings;

pub use conversion::{ConversionService, ConversionServiceTrait};
pub use decimal::FixedPointDecimal;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
