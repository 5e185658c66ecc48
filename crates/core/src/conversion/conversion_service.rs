use log::{debug, error, info, warn};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::conversion_errors::ConversionError;
use super::conversion_model::{
    ChangeDirection, ConversionSessionState, ExchangePrefill, LinkContext, PromptResponse,
    RateEntry, RateInput, RateRequest, RateSource, ResolutionOutcome,
};
use super::conversion_traits::{
    ConversionServiceTrait, CurrencyCodeMetadata, CurrencyMetadataTrait, RatePromptTrait,
    TransactionStoreTrait,
};
use crate::decimal::{DecimalError, FixedPointDecimal};
use crate::errors::{Error, Result};
use crate::fx::{
    CachedExchangeRate, CurrencyLink, CurrencyLinkRegistry, ExchangeRateCache, FxError,
};
use crate::settings::ConversionSettings;

/// Session-scoped data: the last answer slot and the rate cache.
#[derive(Debug, Default)]
struct ConversionSession {
    state: ConversionSessionState,
    cache: ExchangeRateCache,
}

/// Resolves the exchange rate and fees of transactions recorded in a
/// currency other than their account's.
///
/// Resolution order: same currency, existing link, session slot, session
/// cache, and finally the interactive prompt. A whole resolution runs under
/// the session lock, so the single-slot buffer is never shared by two
/// resolutions in flight.
pub struct ConversionService {
    store: Arc<dyn TransactionStoreTrait>,
    prompt: Arc<dyn RatePromptTrait>,
    metadata: Arc<dyn CurrencyMetadataTrait>,
    registry: Arc<RwLock<CurrencyLinkRegistry>>,
    session: Mutex<ConversionSession>,
    settings: ConversionSettings,
}

impl ConversionService {
    pub fn new(
        store: Arc<dyn TransactionStoreTrait>,
        prompt: Arc<dyn RatePromptTrait>,
        registry: Arc<RwLock<CurrencyLinkRegistry>>,
    ) -> Self {
        Self {
            store,
            prompt,
            metadata: Arc::new(CurrencyCodeMetadata),
            registry,
            session: Mutex::new(ConversionSession::default()),
            settings: ConversionSettings::default(),
        }
    }

    /// Sets the provider used to name currencies in validation messages.
    pub fn with_metadata(mut self, metadata: Arc<dyn CurrencyMetadataTrait>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_settings(mut self, settings: ConversionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Shared handle on the link registry, for the file layer to load and save.
    pub fn registry(&self) -> Arc<RwLock<CurrencyLinkRegistry>> {
        self.registry.clone()
    }

    /// Snapshot of the session cache, oldest first.
    pub fn cached_rates(&self) -> Result<Vec<CachedExchangeRate>> {
        Ok(self.lock_session()?.cache.entries().to_vec())
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, ConversionSession>> {
        self.session
            .lock()
            .map_err(|e| Error::Unexpected(format!("Conversion session lock poisoned: {}", e)))
    }

    fn find_link(
        &self,
        account_currency: &str,
        transaction_currency: &str,
    ) -> Result<Option<CurrencyLink>> {
        let registry = self
            .registry
            .read()
            .map_err(|e| Error::Unexpected(format!("Link registry lock poisoned: {}", e)))?;
        Ok(registry
            .find_link(account_currency, transaction_currency)
            .map(|(link, _)| link))
    }

    fn currency_name(&self, currency: &str) -> String {
        self.metadata
            .currency_name(currency)
            .unwrap_or_else(|| currency.to_string())
    }

    fn link_direction(link: &CurrencyLink, account_currency: &str) -> ChangeDirection {
        ChangeDirection::from_account_is_first(link.currency_a == account_currency)
    }

    /// Outcome for a pair that already has a link. The link never carries
    /// fees, and a rate entered earlier in the session overrides the stored one.
    fn linked_outcome(
        state: &ConversionSessionState,
        link: &CurrencyLink,
        account_currency: &str,
    ) -> ResolutionOutcome {
        let fees = if state.last_fees.is_zero() {
            FixedPointDecimal::ZERO
        } else {
            state.last_fees
        };

        let (rate, source) = if state.last_rate.is_zero() {
            (link.rate.abs(), RateSource::Link)
        } else {
            (state.last_rate.abs(), RateSource::SessionSlot)
        };

        ResolutionOutcome {
            rate,
            fees,
            direction: Self::link_direction(link, account_currency),
            source,
        }
    }

    /// Pair without a link: reuse the slot filled by an earlier transaction
    /// of the same batch, otherwise go through the exchange dialog. `force`
    /// skips the cache only; a forced linked pair always reaches the prompt.
    fn resolve_unlinked(
        &self,
        session: &mut ConversionSession,
        account_currency: &str,
        transaction_currency: &str,
        link: Option<CurrencyLink>,
        force: bool,
        prefill: ExchangePrefill,
    ) -> Result<ResolutionOutcome> {
        if link.is_none()
            && self.settings.reuse_session_rate
            && !session.state.last_rate.is_zero()
        {
            debug!(
                "Reusing session rate {} for {} -> {}",
                session.state.last_rate, account_currency, transaction_currency
            );
            return Ok(ResolutionOutcome {
                rate: session.state.last_rate.abs(),
                fees: session.state.last_fees,
                direction: ChangeDirection::AccountIsSecond,
                source: RateSource::SessionSlot,
            });
        }

        self.exchange_dialog(
            session,
            account_currency,
            transaction_currency,
            link,
            prefill,
            force,
        )
    }

    /// Cache first unless forced, then the interactive prompt.
    fn exchange_dialog(
        &self,
        session: &mut ConversionSession,
        account_currency: &str,
        transaction_currency: &str,
        link: Option<CurrencyLink>,
        prefill: ExchangePrefill,
        force: bool,
    ) -> Result<ResolutionOutcome> {
        if !force {
            if let Some((rate, fees)) =
                session.cache.lookup(account_currency, transaction_currency)
            {
                debug!(
                    "Cached rate {} (fees {}) for {} -> {}",
                    rate, fees, account_currency, transaction_currency
                );
                session.state.store(rate, fees);
                let direction = link
                    .as_ref()
                    .map(|l| Self::link_direction(l, account_currency))
                    .unwrap_or_default();
                return Ok(ResolutionOutcome {
                    rate: rate.abs(),
                    fees,
                    direction,
                    source: RateSource::Cache,
                });
            }
        }

        let (rate, entry) = match self.ask_until_valid(
            account_currency,
            transaction_currency,
            link.as_ref(),
            prefill,
        ) {
            Ok(answer) => answer,
            Err(e) => {
                session.state.reset();
                return Err(e);
            }
        };

        let (rate, direction) = self.apply(
            session,
            account_currency,
            transaction_currency,
            link.as_ref(),
            rate,
            &entry,
        )?;

        Ok(ResolutionOutcome {
            rate: rate.abs(),
            fees: entry.fees,
            direction,
            source: RateSource::Prompt,
        })
    }

    /// Shows the prompt until the user confirms a usable rate or cancels.
    fn ask_until_valid(
        &self,
        account_currency: &str,
        transaction_currency: &str,
        link: Option<&CurrencyLink>,
        prefill: ExchangePrefill,
    ) -> Result<(FixedPointDecimal, RateEntry)> {
        let account_currency_name = self.currency_name(account_currency);
        let mut request = RateRequest {
            account_currency: account_currency.to_string(),
            transaction_currency: transaction_currency.to_string(),
            account_currency_name: account_currency_name.clone(),
            rate: Some(prefill.rate).filter(|r| !r.is_zero()),
            fees: Some(prefill.fees.abs()).filter(|f| !f.is_zero()),
            existing_link: link.map(|l| LinkContext {
                link_id: l.id,
                currency_a: l.currency_a.clone(),
                currency_b: l.currency_b.clone(),
                rate: l.rate,
                is_fixed: l.is_fixed,
                change_link_default: !l.is_fixed,
            }),
            validation_message: None,
        };

        loop {
            let entry = match self.prompt.ask(&request) {
                PromptResponse::Confirmed(entry) => entry,
                PromptResponse::Cancelled => {
                    info!(
                        "Exchange rate prompt cancelled for {} -> {}",
                        account_currency, transaction_currency
                    );
                    return Err(ConversionError::ResolutionAborted.into());
                }
            };

            // An existing link fixes the orientation of the entered rate.
            let account_is_first = link
                .map(|l| l.currency_a == account_currency)
                .unwrap_or(entry.account_is_first);

            match self.rate_from_entry(&entry, account_is_first) {
                Ok(rate) => return Ok((rate, entry)),
                Err(e) => {
                    warn!(
                        "Rejected exchange rate for {} -> {}: {}",
                        account_currency, transaction_currency, e
                    );
                    request.validation_message = Some(format!(
                        "The exchange rate or the transaction amount in {} must be filled.",
                        account_currency_name
                    ));
                }
            }
        }
    }

    /// Turns a confirmed entry into "one unit of the first currency equals
    /// `rate` units of the second".
    fn rate_from_entry(
        &self,
        entry: &RateEntry,
        account_is_first: bool,
    ) -> std::result::Result<FixedPointDecimal, ConversionError> {
        let rate = match entry.input {
            RateInput::Direct(rate) => rate,
            RateInput::Amounts {
                account_amount,
                transaction_amount,
            } => {
                let (first, second) = if account_is_first {
                    (account_amount, transaction_amount)
                } else {
                    (transaction_amount, account_amount)
                };
                second
                    .div_with_scale(first, self.settings.division_scale)
                    .map_err(|e| match e {
                        DecimalError::DivisionByZero => ConversionError::DivisionByZero,
                        _ => ConversionError::InvalidRate,
                    })?
            }
        };

        if rate.is_zero() {
            return Err(ConversionError::InvalidRate);
        }
        Ok(rate)
    }

    /// Records a confirmed answer: link graph, session slot, then cache.
    ///
    /// The link is looked up again under the write lock, since the host may
    /// have changed the registry while the prompt was open. `shown` is the
    /// link the entry was made against. Returns the rate in the orientation
    /// of the stored link and the direction the transaction should use.
    fn apply(
        &self,
        session: &mut ConversionSession,
        account_currency: &str,
        transaction_currency: &str,
        shown: Option<&CurrencyLink>,
        rate: FixedPointDecimal,
        entry: &RateEntry,
    ) -> Result<(FixedPointDecimal, ChangeDirection)> {
        debug_assert!(!rate.is_zero(), "applying a zero exchange rate");

        let mut registry = self
            .registry
            .write()
            .map_err(|e| Error::Unexpected(format!("Link registry lock poisoned: {}", e)))?;

        let entered_account_first = shown
            .map(|l| l.currency_a == account_currency)
            .unwrap_or(entry.account_is_first);

        let (rate, direction) = match registry.find_link(account_currency, transaction_currency) {
            Some((link, _)) => {
                let account_is_first = link.currency_a == account_currency;
                let rate = if account_is_first == entered_account_first {
                    rate
                } else {
                    info!(
                        "Link {} appeared while prompting for {} -> {}, inverting entered rate",
                        link.id, account_currency, transaction_currency
                    );
                    FixedPointDecimal::ONE
                        .div_with_scale(rate, self.settings.division_scale)
                        .map_err(|_| ConversionError::InvalidRate)?
                };

                if entry.change_link && link.rate.cmp_value(&rate) != Ordering::Equal {
                    if link.is_fixed {
                        warn!("Link {} is fixed, keeping rate {}", link.id, link.rate);
                    } else if let Err(e) = registry.update_rate(link.id, rate) {
                        link_invariant_failed(e);
                    } else {
                        info!("Link {} rate changed {} -> {}", link.id, link.rate, rate);
                    }
                }
                (rate, Self::link_direction(&link, account_currency))
            }
            None => {
                let (first, second) = if entered_account_first {
                    (account_currency, transaction_currency)
                } else {
                    (transaction_currency, account_currency)
                };
                if let Err(e) = registry.create_link(first, second, rate) {
                    link_invariant_failed(e);
                }
                (rate, ChangeDirection::from_account_is_first(entered_account_first))
            }
        };
        drop(registry);

        session.state.store(rate, entry.fees);
        session
            .cache
            .insert(account_currency, transaction_currency, rate, entry.fees);

        Ok((rate, direction))
    }

    fn apply_to_transaction(
        &self,
        transaction_id: &str,
        outcome: &ResolutionOutcome,
    ) -> Result<()> {
        self.store.set_exchange_rate(transaction_id, outcome.rate)?;
        self.store.set_exchange_fees(transaction_id, outcome.fees)?;
        self.store
            .set_change_direction(transaction_id, outcome.direction)?;
        Ok(())
    }
}

/// The resolver only issues registry calls it knows to be valid; reaching
/// this is a bug. Debug builds stop here, release builds leave the link as is.
fn link_invariant_failed(err: FxError) {
    error!("Currency link invariant violated: {}", err);
    debug_assert!(false, "currency link invariant violated: {}", err);
}

impl ConversionServiceTrait for ConversionService {
    /// Works out the rate, fees and direction of a transaction and writes
    /// them to the store. Cancelling the prompt leaves the transaction as it was.
    fn resolve(&self, transaction_id: &str, force: bool) -> Result<ResolutionOutcome> {
        let transaction_currency = self.store.get_transaction_currency(transaction_id)?;
        let account_currency = self
            .store
            .get_account_currency_for_transaction(transaction_id)?;

        let mut session = self.lock_session()?;

        let outcome = if transaction_currency == account_currency {
            debug!("Transaction {} is in its account currency", transaction_id);
            ResolutionOutcome::neutral()
        } else if transaction_currency.is_empty() || account_currency.is_empty() {
            return Err(ConversionError::MissingCurrency(transaction_id.to_string()).into());
        } else {
            match self.find_link(&account_currency, &transaction_currency)? {
                Some(link) if !force => {
                    Self::linked_outcome(&session.state, &link, &account_currency)
                }
                link => {
                    let prefill = ExchangePrefill {
                        rate: if session.state.last_rate.is_zero() {
                            link.as_ref().map(|l| l.rate).unwrap_or_default()
                        } else {
                            session.state.last_rate
                        },
                        fees: session.state.last_fees,
                    };
                    self.resolve_unlinked(
                        &mut session,
                        &account_currency,
                        &transaction_currency,
                        link,
                        force,
                        prefill,
                    )?
                }
            }
        };

        debug!(
            "Transaction {} resolved: rate {} fees {} {:?} from {:?}",
            transaction_id, outcome.rate, outcome.fees, outcome.direction, outcome.source
        );
        self.apply_to_transaction(transaction_id, &outcome)?;
        Ok(outcome)
    }

    /// Opens the rate prompt directly, e.g. when the form re-edits a rate.
    /// Same cache, apply and cancel rules as `resolve`.
    fn prompt_exchange(
        &self,
        account_currency: &str,
        transaction_currency: &str,
        prefill: ExchangePrefill,
        force: bool,
    ) -> Result<(FixedPointDecimal, FixedPointDecimal)> {
        if account_currency == transaction_currency {
            return Ok((FixedPointDecimal::ZERO, FixedPointDecimal::ZERO));
        }
        if account_currency.is_empty() || transaction_currency.is_empty() {
            return Err(ConversionError::MissingCurrency(format!(
                "{}/{}",
                account_currency, transaction_currency
            ))
            .into());
        }

        let mut session = self.lock_session()?;
        let link = self.find_link(account_currency, transaction_currency)?;
        let outcome = self.exchange_dialog(
            &mut session,
            account_currency,
            transaction_currency,
            link,
            prefill,
            force,
        )?;
        Ok((outcome.rate, outcome.fees))
    }

    fn reset_session(&self) -> Result<()> {
        let mut session = self.lock_session()?;
        session.state.reset();
        session.cache.clear();
        info!("Conversion session reset");
        Ok(())
    }

    fn init_exchanges(&self) -> Result<()> {
        self.lock_session()?.state.reset();
        Ok(())
    }

    fn current_exchange(&self) -> Result<FixedPointDecimal> {
        Ok(self.lock_session()?.state.last_rate)
    }

    fn current_exchange_fees(&self) -> Result<FixedPointDecimal> {
        Ok(self.lock_session()?.state.last_fees)
    }

    fn set_current_exchange(&self, rate: FixedPointDecimal) -> Result<()> {
        self.lock_session()?.state.last_rate = rate;
        Ok(())
    }

    fn set_current_exchange_fees(&self, fees: FixedPointDecimal) -> Result<()> {
        self.lock_session()?.state.last_fees = fees;
        Ok(())
    }
}
