//! Fixed-point decimal module - the exact value type every rate and fee uses.

mod decimal_errors;
mod fixed_decimal;

pub use decimal_errors::DecimalError;
pub use fixed_decimal::FixedPointDecimal;
