use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::currency_link_model::{CurrencyLink, LinkId, MatchedSide};
use super::fx_errors::FxError;
use crate::decimal::FixedPointDecimal;

/// Graph of currency links keyed by unordered currency pair.
///
/// At most one link exists per pair. Persistence belongs to the file layer;
/// [`CurrencyLinkRegistry::to_json`] and [`CurrencyLinkRegistry::from_json`]
/// are the only load/save boundary this type offers.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyLinkRegistry {
    links: Vec<CurrencyLink>,
    #[serde(skip)]
    next_id: u32,
}

impl CurrencyLinkRegistry {
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            next_id: 1,
        }
    }

    /// Builds a registry from previously saved links, keeping their ids and
    /// `is_fixed` flags. Fails on a duplicate pair.
    pub fn from_links(links: Vec<CurrencyLink>) -> Result<Self, FxError> {
        let mut registry = Self::new();
        for link in links {
            registry.insert_link(link)?;
        }
        Ok(registry)
    }

    pub fn from_json(json: &str) -> Result<Self, FxError> {
        let loaded: CurrencyLinkRegistry = serde_json::from_str(json)?;
        Self::from_links(loaded.links)
    }

    pub fn to_json(&self) -> Result<String, FxError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Finds the link for the unordered pair `{x, y}` and reports which
    /// stored slot `x` occupies.
    pub fn find_link(&self, x: &str, y: &str) -> Option<(CurrencyLink, MatchedSide)> {
        self.links.iter().find_map(|link| {
            if link.currency_a == x && link.currency_b == y {
                Some((link.clone(), MatchedSide::First))
            } else if link.currency_a == y && link.currency_b == x {
                Some((link.clone(), MatchedSide::Second))
            } else {
                None
            }
        })
    }

    /// Creates a link where one unit of `first` equals `rate` units of `second`.
    pub fn create_link(
        &mut self,
        first: &str,
        second: &str,
        rate: FixedPointDecimal,
    ) -> Result<LinkId, FxError> {
        let id = self.allocate_id();
        self.insert_link(CurrencyLink {
            id,
            currency_a: first.to_string(),
            currency_b: second.to_string(),
            rate,
            is_fixed: false,
        })?;
        info!("Created currency link {} {} -> {} at {}", id, first, second, rate);
        Ok(id)
    }

    /// Adds a fully formed link, e.g. one read back from storage.
    pub fn insert_link(&mut self, link: CurrencyLink) -> Result<LinkId, FxError> {
        if link.currency_a == link.currency_b {
            return Err(FxError::SelfLink(link.currency_a));
        }
        if self
            .links
            .iter()
            .any(|existing| existing.connects(&link.currency_a, &link.currency_b))
        {
            return Err(FxError::DuplicateLink(link.currency_a, link.currency_b));
        }

        let id = link.id;
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.links.push(link);
        Ok(id)
    }

    /// Replaces the rate of a non-fixed link. The previous rate is not kept.
    pub fn update_rate(
        &mut self,
        link_id: LinkId,
        new_rate: FixedPointDecimal,
    ) -> Result<(), FxError> {
        let link = self
            .links
            .iter_mut()
            .find(|l| l.id == link_id)
            .ok_or(FxError::LinkNotFound(link_id))?;

        if link.is_fixed {
            return Err(FxError::FixedLinkNotEditable(link_id));
        }

        debug!("Link {} rate {} -> {}", link_id, link.rate, new_rate);
        link.rate = new_rate;
        Ok(())
    }

    /// Deletes a link. Only the currency preferences screen does this; the
    /// resolver never removes links.
    pub fn remove_link(&mut self, link_id: LinkId) -> Result<CurrencyLink, FxError> {
        let index = self
            .links
            .iter()
            .position(|l| l.id == link_id)
            .ok_or(FxError::LinkNotFound(link_id))?;
        Ok(self.links.remove(index))
    }

    pub fn get(&self, link_id: LinkId) -> Option<&CurrencyLink> {
        self.links.iter().find(|l| l.id == link_id)
    }

    pub fn links(&self) -> &[CurrencyLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn allocate_id(&self) -> LinkId {
        // next_id is not serialized, so also look past the highest stored id.
        let after_stored = self
            .links
            .iter()
            .map(|l| l.id.0.saturating_add(1))
            .max()
            .unwrap_or(1);
        LinkId(self.next_id.max(after_stored))
    }
}
