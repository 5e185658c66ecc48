//! Property-based integration tests for exchange rate resolution.
//!
//! These tests drive the public API with random currencies, rates and
//! amounts using the `proptest` crate.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use fxlink_core::conversion::{
    ChangeDirection, ConversionService, ConversionServiceTrait, PromptResponse, RatePromptTrait,
    RateRequest, TransactionStoreTrait,
};
use fxlink_core::fx::{CurrencyLinkRegistry, ExchangeRateCache, FxError};
use fxlink_core::{Error, FixedPointDecimal, Result};

// =============================================================================
// Collaborators
// =============================================================================

#[derive(Default)]
struct MemoryStore {
    currencies: Mutex<HashMap<String, (String, String)>>,
    written: Mutex<HashMap<String, (FixedPointDecimal, FixedPointDecimal, ChangeDirection)>>,
}

impl MemoryStore {
    fn add(&self, id: &str, currency: &str, account_currency: &str) {
        self.currencies.lock().unwrap().insert(
            id.to_string(),
            (currency.to_string(), account_currency.to_string()),
        );
    }

    fn written(&self, id: &str) -> (FixedPointDecimal, FixedPointDecimal, ChangeDirection) {
        self.written.lock().unwrap()[id]
    }

    fn pair(&self, id: &str) -> Result<(String, String)> {
        self.currencies
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("unknown transaction {}", id)))
    }

    fn update(
        &self,
        id: &str,
        f: impl FnOnce(&mut (FixedPointDecimal, FixedPointDecimal, ChangeDirection)),
    ) -> Result<()> {
        let mut written = self.written.lock().unwrap();
        let entry = written.entry(id.to_string()).or_insert((
            FixedPointDecimal::ONE,
            FixedPointDecimal::ONE,
            ChangeDirection::AccountIsFirst,
        ));
        f(entry);
        Ok(())
    }
}

impl TransactionStoreTrait for MemoryStore {
    fn get_transaction_currency(&self, transaction_id: &str) -> Result<String> {
        Ok(self.pair(transaction_id)?.0)
    }

    fn get_account_currency_for_transaction(&self, transaction_id: &str) -> Result<String> {
        Ok(self.pair(transaction_id)?.1)
    }

    fn set_exchange_rate(&self, transaction_id: &str, rate: FixedPointDecimal) -> Result<()> {
        self.update(transaction_id, |w| w.0 = rate)
    }

    fn set_exchange_fees(&self, transaction_id: &str, fees: FixedPointDecimal) -> Result<()> {
        self.update(transaction_id, |w| w.1 = fees)
    }

    fn set_change_direction(&self, transaction_id: &str, direction: ChangeDirection) -> Result<()> {
        self.update(transaction_id, |w| w.2 = direction)
    }
}

/// A prompt that must never be shown.
struct NoPrompt;

impl RatePromptTrait for NoPrompt {
    fn ask(&self, request: &RateRequest) -> PromptResponse {
        panic!(
            "unexpected prompt for {} -> {}",
            request.account_currency, request.transaction_currency
        );
    }
}

// =============================================================================
// Generators
// =============================================================================

fn arb_currency() -> impl Strategy<Value = String> {
    "[A-Z]{3}"
}

fn arb_distinct_pair() -> impl Strategy<Value = (String, String)> {
    (arb_currency(), arb_currency()).prop_filter("currencies must differ", |(a, b)| a != b)
}

/// Nonzero rate with up to six fractional digits.
fn arb_rate() -> impl Strategy<Value = FixedPointDecimal> {
    (1i128..1_000_000_000, 0u32..=6)
        .prop_map(|(mantissa, scale)| FixedPointDecimal::from_parts(mantissa, scale).unwrap())
}

/// Amount in cents, scale 2.
fn arb_amount(max_cents: i128) -> impl Strategy<Value = FixedPointDecimal> {
    (1i128..max_cents).prop_map(|cents| FixedPointDecimal::from_parts(cents, 2).unwrap())
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Same-currency transactions are neutral and never touch links or cache.
    #[test]
    fn prop_same_currency_is_neutral(currency in arb_currency()) {
        let store = Arc::new(MemoryStore::default());
        let registry = Arc::new(RwLock::new(CurrencyLinkRegistry::new()));
        let service = ConversionService::new(store.clone(), Arc::new(NoPrompt), registry.clone());
        store.add("t", &currency, &currency);

        let outcome = service.resolve("t", false).unwrap();

        prop_assert!(outcome.rate.is_zero());
        prop_assert!(outcome.fees.is_zero());
        let (rate, fees, _) = store.written("t");
        prop_assert!(rate.is_zero());
        prop_assert!(fees.is_zero());
        prop_assert!(registry.read().unwrap().is_empty());
        prop_assert!(service.cached_rates().unwrap().is_empty());
    }

    /// An account whose currency is the link's first currency gets AccountIsFirst.
    #[test]
    fn prop_link_first_currency_means_account_first(
        (x, y) in arb_distinct_pair(),
        rate in arb_rate(),
    ) {
        let mut links = CurrencyLinkRegistry::new();
        links.create_link(&x, &y, rate).unwrap();
        let registry = Arc::new(RwLock::new(links));
        let store = Arc::new(MemoryStore::default());
        let service = ConversionService::new(store.clone(), Arc::new(NoPrompt), registry);

        store.add("a", &y, &x);
        store.add("b", &x, &y);

        let a = service.resolve("a", false).unwrap();
        let b = service.resolve("b", false).unwrap();
        prop_assert_eq!(a.direction, ChangeDirection::AccountIsFirst);
        prop_assert_eq!(b.direction, ChangeDirection::AccountIsSecond);
        prop_assert_eq!(store.written("a").0, rate);
    }

    /// The earliest cache entry for an ordered pair always wins.
    #[test]
    fn prop_cache_earliest_entry_wins(
        (x, y) in arb_distinct_pair(),
        entries in proptest::collection::vec((arb_rate(), arb_rate()), 1..8),
    ) {
        let mut cache = ExchangeRateCache::new();
        for (rate, fees) in &entries {
            cache.insert(&x, &y, *rate, *fees);
        }

        prop_assert_eq!(cache.lookup(&x, &y), Some(entries[0]));
        prop_assert_eq!(cache.lookup(&y, &x), None);
    }

    /// A second link for the same unordered pair is refused and changes nothing.
    #[test]
    fn prop_duplicate_link_is_refused(
        (x, y) in arb_distinct_pair(),
        first in arb_rate(),
        second in arb_rate(),
        swap in any::<bool>(),
    ) {
        let mut registry = CurrencyLinkRegistry::new();
        registry.create_link(&x, &y, first).unwrap();
        let before = registry.links().to_vec();

        let result = if swap {
            registry.create_link(&y, &x, second)
        } else {
            registry.create_link(&x, &y, second)
        };

        prop_assert!(matches!(result, Err(FxError::DuplicateLink(_, _))));
        prop_assert_eq!(registry.links(), before.as_slice());
    }

    /// A rate derived from two amounts gives back the second amount at cent precision.
    #[test]
    fn prop_derived_rate_has_no_cent_drift(
        account in arb_amount(100_000),
        transaction in arb_amount(10_000_000),
    ) {
        let rate = transaction.checked_div(account).unwrap();
        prop_assert!(!rate.is_zero());
        prop_assert_eq!((account * rate).rescale(2), transaction.rescale(2));
    }
}
