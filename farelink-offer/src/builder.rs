use farelink_core::response::EntityKind;
use farelink_core::scope::{collect_refs, ResponseIdValue, ScopedOffer};
use serde::Serialize;

/// Failure of an offer-stage request builder. `Scope` variants carry the
/// inspectable resolution errors; producing a payload with a placeholder
/// airline instead is a defect, not a degraded mode.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Scope(#[from] farelink_core::ScopeError),

    #[error("offer at global index {0} carries no OfferID")]
    MissingOfferId(i64),
}

/// Reference to the selected offer as the upstream API expects it: the offer
/// id, its owner, and the entity keys it reaches - restricted to keys that
/// exist in the owning airline's own tables.
#[derive(Debug, Clone, Serialize)]
pub struct OfferRef {
    #[serde(rename = "OfferID")]
    pub offer_id: ResponseIdValue,

    #[serde(rename = "Owner")]
    pub owner: String,

    #[serde(rename = "refs", skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<String>,
}

impl OfferRef {
    pub(crate) fn from_scoped(scoped: &ScopedOffer<'_>, selection: i64) -> Result<Self, BuildError> {
        let offer = scoped.resolved.offer;
        let id = offer
            .offer_id
            .as_ref()
            .ok_or(BuildError::MissingOfferId(selection))?;

        // Multi-path references dedupe first-seen in collect_refs; keys that
        // are not in this airline's tables are dropped here.
        let refs = collect_refs(&offer.priced_offer)
            .into_iter()
            .filter(|key| {
                EntityKind::ALL
                    .iter()
                    .any(|&kind| scoped.context.tables.contains(kind, key))
            })
            .collect();

        Ok(Self {
            offer_id: ResponseIdValue {
                value: id.value.clone(),
            },
            owner: scoped.resolved.airline.to_string(),
            refs,
        })
    }

    /// The subset of this offer's refs that name entities of one kind.
    pub(crate) fn refs_of_kind(&self, scoped: &ScopedOffer<'_>, kind: EntityKind) -> Vec<String> {
        self.refs
            .iter()
            .filter(|key| scoped.context.tables.contains(kind, key))
            .cloned()
            .collect()
    }
}
