use serde::{Deserialize, Serialize};

use crate::decimal::FixedPointDecimal;
use crate::fx::LinkId;

/// Which side of the currency link the account's currency occupies.
/// Decides the sign convention when the store multiplies amounts by the rate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeDirection {
    AccountIsFirst,
    #[default]
    AccountIsSecond,
}

impl ChangeDirection {
    /// The transaction record's boolean "change between" flag.
    pub fn change_between(self) -> bool {
        matches!(self, ChangeDirection::AccountIsFirst)
    }

    pub fn from_account_is_first(account_is_first: bool) -> Self {
        if account_is_first {
            ChangeDirection::AccountIsFirst
        } else {
            ChangeDirection::AccountIsSecond
        }
    }
}

/// Where a resolved rate came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateSource {
    SameCurrency,
    Link,
    SessionSlot,
    Cache,
    Prompt,
}

/// The answer `resolve` writes to the transaction and returns to its caller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutcome {
    pub rate: FixedPointDecimal,
    pub fees: FixedPointDecimal,
    pub direction: ChangeDirection,
    pub source: RateSource,
}

impl ResolutionOutcome {
    pub fn neutral() -> Self {
        Self {
            rate: FixedPointDecimal::ZERO,
            fees: FixedPointDecimal::ZERO,
            direction: ChangeDirection::AccountIsSecond,
            source: RateSource::SameCurrency,
        }
    }
}

/// Single-slot "last answer" buffer shared by consecutive resolutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSessionState {
    pub last_rate: FixedPointDecimal,
    pub last_fees: FixedPointDecimal,
}

impl ConversionSessionState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn store(&mut self, rate: FixedPointDecimal, fees: FixedPointDecimal) {
        self.last_rate = rate;
        self.last_fees = fees;
    }
}

/// Values shown pre-filled when the prompt is opened to re-edit a rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExchangePrefill {
    pub rate: FixedPointDecimal,
    pub fees: FixedPointDecimal,
}

/// Details of the link that already joins the prompted pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkContext {
    pub link_id: LinkId,
    pub currency_a: String,
    pub currency_b: String,
    pub rate: FixedPointDecimal,
    pub is_fixed: bool,
    /// Initial state of the "change the link" toggle.
    pub change_link_default: bool,
}

/// Everything the rate prompt needs to render itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub account_currency: String,
    pub transaction_currency: String,
    /// Display name of the account currency, used in labels and messages.
    pub account_currency_name: String,
    /// Pre-filled rate, `None` unless nonzero.
    pub rate: Option<FixedPointDecimal>,
    /// Pre-filled fees, `None` unless nonzero.
    pub fees: Option<FixedPointDecimal>,
    pub existing_link: Option<LinkContext>,
    /// Set when a previous confirmation was rejected.
    pub validation_message: Option<String>,
}

/// How the user expressed the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateInput {
    Direct(FixedPointDecimal),
    Amounts {
        account_amount: FixedPointDecimal,
        transaction_amount: FixedPointDecimal,
    },
}

/// A confirmed prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEntry {
    pub input: RateInput,
    pub fees: FixedPointDecimal,
    /// The user's choice of which currency comes first in a new link.
    pub account_is_first: bool,
    /// State of the "change the link" toggle; ignored when no link exists.
    pub change_link: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Confirmed(RateEntry),
    Cancelled,
}
