use farelink_core::detect;
use farelink_core::references::ReferenceExtractor;
use farelink_core::response::{EntityKind, PricedResponse};
use farelink_core::scope::{ResponseIdValue, ScopedDataLists, SessionRef};
use farelink_core::ScopeError;
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

use crate::models::{
    OrderCreateRequest, OrderOfferItem, OrderOfferRef, OrderQuery, OrderSpec, PassengerList,
    PassengerOut, PassengerSpec,
};

#[derive(Debug, thiserror::Error)]
pub enum OrderBuildError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("an order requires at least one passenger")]
    NoPassengers,

    #[error("priced offer at position {0} carries no OfferID")]
    MissingOfferId(usize),
}

/// Build an order-creation request from a pricing response that was already
/// narrowed to one airline.
///
/// Ownership comes from the sole airline identifier in the prior response -
/// zero or several distinct owners is an `OwnershipUnresolved` failure, and
/// every passenger must answer a traveler key in that airline's own tables.
pub fn build_order_create_request(
    priced: &PricedResponse,
    passengers: &[PassengerSpec],
    payments: Option<Value>,
) -> Result<OrderCreateRequest, OrderBuildError> {
    if passengers.is_empty() {
        return Err(OrderBuildError::NoPassengers);
    }

    let airline = detect::sole_airline(priced)?;
    let extractor = ReferenceExtractor::for_priced(priced)?;
    let context = extractor.context_for(&airline)?;
    let session_id = extractor.shopping_response_id(Some(&airline))?;

    for passenger in passengers {
        if !context
            .tables
            .contains(EntityKind::Travelers, &passenger.traveler_ref)
        {
            return Err(ScopeError::ReferenceMissing {
                airline: airline.to_string(),
                kind: EntityKind::Travelers.label(),
                key: passenger.traveler_ref.clone(),
            }
            .into());
        }
    }

    let mut offers = Vec::new();
    for (position, offer) in priced.priced_flight_offers.offers.iter().enumerate() {
        let id = offer
            .offer_id
            .as_ref()
            .ok_or(OrderBuildError::MissingOfferId(position))?;

        // One order item per distinct price-line item id, first-seen order
        let mut seen = HashSet::new();
        let mut offer_items = Vec::new();
        for line in &offer.offer_prices {
            if let Some(item_id) = line["OfferItemID"].as_str() {
                if seen.insert(item_id.to_string()) {
                    offer_items.push(OrderOfferItem {
                        offer_item_id: item_id.to_string(),
                    });
                }
            }
        }

        offers.push(OrderOfferRef {
            offer_id: ResponseIdValue {
                value: id.value.clone(),
            },
            owner: airline.to_string(),
            offer_items,
        });
    }

    let data_lists = ScopedDataLists::from_context(context, &EntityKind::ALL);
    info!(
        airline = airline.as_str(),
        passengers = passengers.len(),
        offers = offers.len(),
        "built order create request"
    );
    Ok(OrderCreateRequest {
        query: OrderQuery {
            order: OrderSpec { offers },
            passengers: PassengerList {
                items: passengers.iter().map(PassengerOut::from).collect(),
            },
            payments,
        },
        data_lists,
        shopping_response_id: SessionRef::new(&airline, session_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn priced_response() -> PricedResponse {
        serde_json::from_value(json!({
            "PricedFlightOffers": { "PricedFlightOffer": [
                {
                    "OfferID": { "value": "QR-OFFER-1", "Owner": "QR" },
                    "OfferPrice": [
                        { "OfferItemID": "QR-ITEM-1", "RequestedDate": { "PriceDetail": {} } },
                        { "OfferItemID": "QR-ITEM-2" },
                        // Repeated item id from a second association path
                        { "OfferItemID": "QR-ITEM-1" }
                    ]
                }
            ]},
            "DataLists": {
                "AnonymousTravelerList": { "AnonymousTraveler": [
                    { "ObjectKey": "QR-T1", "PTC": { "value": "ADT" } },
                    { "ObjectKey": "QR-T2", "PTC": { "value": "CHD" } }
                ]},
                "FlightSegmentList": { "FlightSegment": [
                    { "SegmentKey": "QR-SEG1" },
                    { "SegmentKey": "QR-SEG2" }
                ]},
                "FareList": { "FareGroup": [{ "ListKey": "QR-FG1" }] },
                "ServiceList": { "Service": [
                    { "ObjectKey": "QR-SRV1", "Name": { "value": "Extra Bag" } }
                ]}
            },
            "ShoppingResponseID": { "Owner": "QR", "ResponseID": { "value": "SESSION-QR" } }
        }))
        .unwrap()
    }

    fn passenger(traveler_ref: &str, ptc: &str, given: &str, surname: &str) -> PassengerSpec {
        PassengerSpec {
            traveler_ref: traveler_ref.to_string(),
            ptc: ptc.to_string(),
            title: None,
            given_name: given.to_string().into(),
            surname: surname.to_string().into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            email: Some("jensen@example.com".to_string().into()),
            phone: None,
        }
    }

    #[test]
    fn test_order_scoped_to_sole_airline() {
        let priced = priced_response();
        let passengers = vec![
            passenger("QR-T1", "ADT", "Alex", "Jensen"),
            passenger("QR-T2", "CHD", "Sam", "Jensen"),
        ];

        let request = build_order_create_request(&priced, &passengers, None).unwrap();
        assert_eq!(request.owner(), "QR");
        assert_eq!(request.shopping_response_id.response_id.value, "SESSION-QR");

        let offer = &request.query.order.offers[0];
        assert_eq!(offer.offer_id.value, "QR-OFFER-1");
        // Item ids deduped first-seen
        let items: Vec<_> = offer
            .offer_items
            .iter()
            .map(|i| i.offer_item_id.as_str())
            .collect();
        assert_eq!(items, vec!["QR-ITEM-1", "QR-ITEM-2"]);

        let keys = request.data_lists.entity_keys();
        assert!(keys.contains(&"QR-SRV1".to_string()));
        for key in keys {
            assert!(key.starts_with("QR-"), "leaked key: {key}");
        }
    }

    #[test]
    fn test_unknown_traveler_ref_is_reference_missing() {
        let priced = priced_response();
        let passengers = vec![passenger("QR-T9", "ADT", "Alex", "Jensen")];

        let err = build_order_create_request(&priced, &passengers, None).unwrap_err();
        assert!(matches!(
            err,
            OrderBuildError::Scope(ScopeError::ReferenceMissing { .. })
        ));
    }

    #[test]
    fn test_empty_passenger_list_rejected() {
        let priced = priced_response();
        assert!(matches!(
            build_order_create_request(&priced, &[], None),
            Err(OrderBuildError::NoPassengers)
        ));
    }

    #[test]
    fn test_mixed_airline_prior_response_rejected() {
        let mixed: PricedResponse = serde_json::from_value(json!({
            "PricedFlightOffers": { "PricedFlightOffer": [
                { "OfferID": { "value": "QR-OFFER-1", "Owner": "QR" } }
            ]},
            "DataLists": {
                "AnonymousTravelerList": { "AnonymousTraveler": [
                    { "ObjectKey": "QR-T1" },
                    { "ObjectKey": "KL-T1" }
                ]}
            }
        }))
        .unwrap();
        let passengers = vec![passenger("QR-T1", "ADT", "Alex", "Jensen")];

        assert!(matches!(
            build_order_create_request(&mixed, &passengers, None),
            Err(OrderBuildError::Scope(ScopeError::OwnershipUnresolved(_)))
        ));
    }

    #[test]
    fn test_pii_masked_in_debug_but_serialized() {
        let priced = priced_response();
        let passengers = vec![passenger("QR-T1", "ADT", "Alex", "Jensen")];
        let request = build_order_create_request(&priced, &passengers, None).unwrap();

        let debugged = format!("{:?}", request);
        assert!(!debugged.contains("Jensen"));
        assert!(!debugged.contains("jensen@example.com"));

        let rendered = serde_json::to_value(&request).unwrap();
        let out = &rendered["Query"]["Passengers"]["Passenger"][0];
        assert_eq!(out["Name"]["Surname"], "Jensen");
        assert_eq!(out["Contacts"]["EmailContact"], "jensen@example.com");
        assert_eq!(out["BirthDate"], "1990-05-17");
    }

    #[test]
    fn test_payments_passed_through() {
        let priced = priced_response();
        let passengers = vec![passenger("QR-T1", "ADT", "Alex", "Jensen")];
        let payments = json!({ "Payment": [{ "Amount": { "value": 1520.0, "Code": "USD" } }] });

        let request =
            build_order_create_request(&priced, &passengers, Some(payments.clone())).unwrap();
        let rendered = serde_json::to_value(&request).unwrap();
        assert_eq!(rendered["Query"]["Payments"], payments);
    }
}
