use thiserror::Error;

use super::currency_link_model::LinkId;

/// Errors raised by the currency link registry and the exchange rate cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("A link between {0} and {1} already exists")]
    DuplicateLink(String, String),

    #[error("Link {0} is fixed and cannot be edited")]
    FixedLinkNotEditable(LinkId),

    #[error("Link {0} not found")]
    LinkNotFound(LinkId),

    #[error("A currency cannot be linked to itself: {0}")]
    SelfLink(String),

    #[error("Failed to (de)serialize currency links: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FxError {
    fn from(err: serde_json::Error) -> Self {
        FxError::Serialization(err.to_string())
    }
}
