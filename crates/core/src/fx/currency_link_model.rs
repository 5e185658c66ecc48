use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::FixedPointDecimal;

/// Identifier of a link inside a registry. Ids start at 1 and are never reused.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A relationship between two currencies: one unit of `currency_a` equals
/// `rate` units of `currency_b`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyLink {
    pub id: LinkId,
    pub currency_a: String,
    pub currency_b: String,
    pub rate: FixedPointDecimal,
    /// Historical links (e.g. a legacy currency and its successor) can't be edited.
    #[serde(default)]
    pub is_fixed: bool,
}

impl CurrencyLink {
    /// True when the link joins `x` and `y`, in either order.
    pub fn connects(&self, x: &str, y: &str) -> bool {
        (self.currency_a == x && self.currency_b == y)
            || (self.currency_a == y && self.currency_b == x)
    }
}

/// Which stored slot the first queried currency occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedSide {
    /// The first queried currency is the link's `currency_a`.
    First,
    /// The first queried currency is the link's `currency_b`.
    Second,
}
