use farelink_shared::airline::AirlineCode;
use tracing::trace;

use crate::response::{AirlineOfferGroup, Offer, ShoppingResponse};
use crate::{ScopeError, ScopeResult};

/// Outcome of resolving a global offer index against one response snapshot.
#[derive(Debug)]
pub struct ResolvedOffer<'a> {
    pub group: &'a AirlineOfferGroup,
    /// Position of the owning group within the response.
    pub group_index: usize,
    /// Position of the offer within its group's offer list.
    pub local_index: usize,
    pub offer: &'a Offer,
    pub airline: AirlineCode,
}

/// Count of priced offers across all airline groups. Unpriced entries are not
/// bookable and never consume an index slot.
pub fn total_offers(response: &ShoppingResponse) -> usize {
    response
        .offers_group
        .airline_offers
        .iter()
        .flat_map(|group| group.offers.iter())
        .filter(|offer| offer.is_priced())
        .count()
}

/// Resolve a zero-based global offer index to its offer and owning airline.
///
/// Traversal order is the response's own: groups in document order, offers in
/// list order, counting only priced entries. Global indices are meaningful
/// only relative to one immutable response snapshot, so this re-traverses on
/// every call instead of caching.
pub fn resolve(response: &ShoppingResponse, index: i64) -> ScopeResult<ResolvedOffer<'_>> {
    let total = total_offers(response);
    if index < 0 || index as usize >= total {
        return Err(ScopeError::IndexOutOfRange { index, total });
    }
    let target = index as usize;

    let mut counter = 0usize;
    for (group_index, group) in response.offers_group.airline_offers.iter().enumerate() {
        for (local_index, offer) in group.offers.iter().enumerate() {
            if !offer.is_priced() {
                continue;
            }
            if counter == target {
                let airline = offer
                    .owner_code()
                    .or_else(|| group.owner_code())
                    .ok_or_else(|| {
                        ScopeError::OwnershipUnresolved(format!(
                            "offer at global index {index} names no owning airline"
                        ))
                    })?;
                trace!(
                    index,
                    group_index,
                    local_index,
                    airline = airline.as_str(),
                    "resolved global offer index"
                );
                return Ok(ResolvedOffer {
                    group,
                    group_index,
                    local_index,
                    offer,
                    airline,
                });
            }
            counter += 1;
        }
    }

    // Priced offers changed under us mid-traversal would be the only way
    // here; report it as the same out-of-range condition.
    Err(ScopeError::IndexOutOfRange { index, total })
}
