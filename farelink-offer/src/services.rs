use farelink_core::references::ReferenceExtractor;
use farelink_core::response::{EntityKind, ShoppingResponse};
use farelink_core::scope::{scope_offer, ScopedDataLists, SessionRef};
use farelink_shared::carriers;
use serde::Serialize;
use tracing::{info, warn};

use crate::builder::{BuildError, OfferRef};

const DATA_LIST_KINDS: &[EntityKind] = &[
    EntityKind::Travelers,
    EntityKind::Segments,
    EntityKind::Flights,
    EntityKind::OriginDestinations,
];

/// Outbound service-list (ancillaries) request for one airline's offer.
#[derive(Debug, Serialize)]
pub struct ServiceListRequest {
    #[serde(rename = "Query")]
    pub query: ServiceQuery,

    #[serde(rename = "DataLists", skip_serializing_if = "ScopedDataLists::is_empty")]
    pub data_lists: ScopedDataLists,

    #[serde(rename = "ShoppingResponseID")]
    pub shopping_response_id: SessionRef,
}

#[derive(Debug, Serialize)]
pub struct ServiceQuery {
    #[serde(rename = "Offer")]
    pub offer: OfferRef,
}

impl ServiceListRequest {
    pub fn owner(&self) -> &str {
        &self.shopping_response_id.owner
    }
}

/// Build a service-list request for the offer at `selection`.
pub fn build_service_list_request(
    response: &ShoppingResponse,
    selection: i64,
) -> Result<ServiceListRequest, BuildError> {
    let extractor = ReferenceExtractor::for_shopping(response);
    let scoped = scope_offer(response, &extractor, selection)?;
    let offer = OfferRef::from_scoped(&scoped, selection)?;

    let airline = scoped.resolved.airline.as_str();
    if !carriers::supports_service_list(airline) {
        warn!(
            airline,
            carrier = carriers::display_name(airline),
            "carrier is not certified for ancillary services"
        );
    }

    let data_lists = ScopedDataLists::from_context(scoped.context, DATA_LIST_KINDS);
    info!(selection, airline, "built service list request");
    Ok(ServiceListRequest {
        query: ServiceQuery { offer },
        data_lists,
        shopping_response_id: scoped.session,
    })
}
