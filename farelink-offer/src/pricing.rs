use farelink_core::references::ReferenceExtractor;
use farelink_core::response::{EntityKind, ShoppingResponse};
use farelink_core::scope::{scope_offer, ScopedDataLists, SessionRef};
use serde::Serialize;
use tracing::info;

use crate::builder::{BuildError, OfferRef};

/// Entity types a pricing request carries. Fare and baggage data travel with
/// the offer; seat maps and ancillaries are requested separately.
const DATA_LIST_KINDS: &[EntityKind] = &[
    EntityKind::Travelers,
    EntityKind::Segments,
    EntityKind::Flights,
    EntityKind::OriginDestinations,
    EntityKind::FareGroups,
    EntityKind::CarryOnAllowances,
    EntityKind::CheckedBagAllowances,
    EntityKind::PriceMetadata,
];

/// Outbound flight-price request, restricted to one airline's data.
#[derive(Debug, Serialize)]
pub struct FlightPriceRequest {
    #[serde(rename = "Query")]
    pub query: PriceQuery,

    #[serde(rename = "DataLists", skip_serializing_if = "ScopedDataLists::is_empty")]
    pub data_lists: ScopedDataLists,

    #[serde(rename = "ShoppingResponseID")]
    pub shopping_response_id: SessionRef,
}

#[derive(Debug, Serialize)]
pub struct PriceQuery {
    #[serde(rename = "Offers")]
    pub offers: QueryOffers,
}

#[derive(Debug, Serialize)]
pub struct QueryOffers {
    #[serde(rename = "Offer")]
    pub items: Vec<OfferRef>,
}

impl FlightPriceRequest {
    /// The airline the request is routed to.
    pub fn owner(&self) -> &str {
        &self.shopping_response_id.owner
    }
}

/// Build a pricing request for the offer at `selection`.
///
/// The selection is the global offer index assigned by flattening all airline
/// groups in response order; it is re-resolved here against the same
/// response snapshot it was assigned from.
pub fn build_flight_price_request(
    response: &ShoppingResponse,
    selection: i64,
) -> Result<FlightPriceRequest, BuildError> {
    let extractor = ReferenceExtractor::for_shopping(response);
    let scoped = scope_offer(response, &extractor, selection)?;
    let offer_ref = OfferRef::from_scoped(&scoped, selection)?;
    let data_lists = ScopedDataLists::from_context(scoped.context, DATA_LIST_KINDS);

    info!(
        selection,
        airline = scoped.resolved.airline.as_str(),
        "built flight price request"
    );
    Ok(FlightPriceRequest {
        query: PriceQuery {
            offers: QueryOffers {
                items: vec![offer_ref],
            },
        },
        data_lists,
        shopping_response_id: scoped.session,
    })
}
