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

/// Outbound seat-availability request for one airline's offer.
#[derive(Debug, Serialize)]
pub struct SeatAvailabilityRequest {
    #[serde(rename = "Query")]
    pub query: SeatQuery,

    #[serde(rename = "DataLists", skip_serializing_if = "ScopedDataLists::is_empty")]
    pub data_lists: ScopedDataLists,

    #[serde(rename = "ShoppingResponseID")]
    pub shopping_response_id: SessionRef,
}

#[derive(Debug, Serialize)]
pub struct SeatQuery {
    #[serde(rename = "Offer")]
    pub offer: OfferRef,

    /// Segments to fetch seat maps for, scoped to the owning airline.
    #[serde(rename = "SegmentKeys", skip_serializing_if = "Vec::is_empty")]
    pub segment_keys: Vec<String>,
}

impl SeatAvailabilityRequest {
    pub fn owner(&self) -> &str {
        &self.shopping_response_id.owner
    }
}

/// Build a seat-availability request for the offer at `selection`.
pub fn build_seat_availability_request(
    response: &ShoppingResponse,
    selection: i64,
) -> Result<SeatAvailabilityRequest, BuildError> {
    let extractor = ReferenceExtractor::for_shopping(response);
    let scoped = scope_offer(response, &extractor, selection)?;
    let offer = OfferRef::from_scoped(&scoped, selection)?;

    // Capability is advisory only; the upstream API is the final authority.
    let airline = scoped.resolved.airline.as_str();
    if !carriers::supports_seat_selection(airline) {
        warn!(
            airline,
            carrier = carriers::display_name(airline),
            "carrier is not certified for seat selection"
        );
    }

    // Seat maps for the segments the offer references; when the priced
    // detail references none, fall back to the airline's whole segment table.
    let mut segment_keys = offer.refs_of_kind(&scoped, EntityKind::Segments);
    if segment_keys.is_empty() {
        segment_keys = scoped
            .context
            .tables
            .table(EntityKind::Segments)
            .keys()
            .cloned()
            .collect();
    }

    let data_lists = ScopedDataLists::from_context(scoped.context, DATA_LIST_KINDS);
    info!(selection, airline, "built seat availability request");
    Ok(SeatAvailabilityRequest {
        query: SeatQuery {
            offer,
            segment_keys,
        },
        data_lists,
        shopping_response_id: scoped.session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{single_airline_response, two_airline_response};
    use farelink_core::ScopeError;

    #[test]
    fn test_segment_keys_are_airline_scoped() {
        let response = two_airline_response();
        let request = build_seat_availability_request(&response, 4).unwrap();

        assert_eq!(request.owner(), "QR");
        assert_eq!(request.query.segment_keys, vec!["QR-SEG1", "QR-SEG2"]);
        for key in request.data_lists.entity_keys() {
            assert!(key.starts_with("QR-"), "leaked key: {key}");
        }
    }

    #[test]
    fn test_kl_selection_gets_kl_session() {
        let response = two_airline_response();
        let request = build_seat_availability_request(&response, 2).unwrap();

        assert_eq!(request.owner(), "KL");
        assert_eq!(request.shopping_response_id.response_id.value, "SESSION-KL");
        assert_eq!(request.query.offer.offer_id.value, "KL-OFFER-2");
    }

    #[test]
    fn test_fare_groups_not_copied_for_seats() {
        let response = two_airline_response();
        let request = build_seat_availability_request(&response, 0).unwrap();
        let rendered = serde_json::to_value(&request).unwrap();
        assert!(rendered["DataLists"].get("FareList").is_none());
        assert!(rendered["DataLists"].get("FlightSegmentList").is_some());
    }

    #[test]
    fn test_out_of_range_selection() {
        let response = single_airline_response();
        assert!(matches!(
            build_seat_availability_request(&response, 2),
            Err(BuildError::Scope(ScopeError::IndexOutOfRange { total: 2, .. }))
        ));
    }

    #[test]
    fn test_single_airline_whole_table_fallback() {
        let response = single_airline_response();
        let request = build_seat_availability_request(&response, 0).unwrap();
        // OFFER-1 references SEG1 only
        assert_eq!(request.query.segment_keys, vec!["SEG1"]);
        assert_eq!(request.owner(), "LH");
    }
}
