use serde::Serialize;

use crate::decimal::FixedPointDecimal;

/// A rate and fees resolved earlier in the session for an ordered pair.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CachedExchangeRate {
    pub currency_a: String,
    pub currency_b: String,
    pub rate: FixedPointDecimal,
    pub fees: FixedPointDecimal,
}

/// Session-scoped, append-only list of resolved rates.
///
/// Lookups match the exact `(currency_a, currency_b)` order, never the
/// reverse, and the earliest inserted entry wins: a later insert for the same
/// pair is kept but can never be returned. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ExchangeRateCache {
    entries: Vec<CachedExchangeRate>,
}

impl ExchangeRateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, x: &str, y: &str) -> Option<(FixedPointDecimal, FixedPointDecimal)> {
        self.entries
            .iter()
            .find(|e| e.currency_a == x && e.currency_b == y)
            .map(|e| (e.rate, e.fees))
    }

    pub fn insert(&mut self, x: &str, y: &str, rate: FixedPointDecimal, fees: FixedPointDecimal) {
        self.entries.push(CachedExchangeRate {
            currency_a: x.to_string(),
            currency_b: y.to_string(),
            rate,
            fees,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[CachedExchangeRate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fpd(d: rust_decimal::Decimal) -> FixedPointDecimal {
        FixedPointDecimal::new(d)
    }

    #[test]
    fn test_lookup_is_ordered() {
        let mut cache = ExchangeRateCache::new();
        cache.insert("USD", "EUR", fpd(dec!(0.92)), fpd(dec!(1.50)));

        assert_eq!(
            cache.lookup("USD", "EUR"),
            Some((fpd(dec!(0.92)), fpd(dec!(1.50))))
        );
        assert_eq!(cache.lookup("EUR", "USD"), None);
    }

    #[test]
    fn test_earliest_entry_wins() {
        let mut cache = ExchangeRateCache::new();
        cache.insert("USD", "EUR", fpd(dec!(0.92)), fpd(dec!(1.50)));
        cache.insert("USD", "EUR", fpd(dec!(0.95)), fpd(dec!(2.00)));

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.lookup("USD", "EUR"),
            Some((fpd(dec!(0.92)), fpd(dec!(1.50))))
        );
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut cache = ExchangeRateCache::new();
        cache.insert("USD", "EUR", fpd(dec!(0.92)), FixedPointDecimal::ZERO);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("USD", "EUR"), None);
    }
}
