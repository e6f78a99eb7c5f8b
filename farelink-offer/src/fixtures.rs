use farelink_core::response::ShoppingResponse;
use serde_json::{json, Value};

fn offer(owner: &str, id: &str, refs: Vec<Vec<&str>>) -> Value {
    let price_lines: Vec<Value> = refs
        .into_iter()
        .enumerate()
        .map(|(i, line_refs)| {
            json!({
                "OfferItemID": format!("{id}-ITEM-{i}"),
                "FareDetail": { "FareComponent": [{ "refs": line_refs }] }
            })
        })
        .collect();
    json!({
        "OfferID": { "value": id, "Owner": owner },
        "TotalPrice": { "DetailCurrencyPrice": { "Total": { "value": 250.0 } } },
        "PricedOffer": { "OfferPrice": price_lines }
    })
}

/// Two-airline response: KL owns global indices 0-2, QR owns 3-5.
/// QR's second offer (global index 4) reaches QR-FG1 from both of its price
/// lines, which exercises the first-seen dedupe.
pub(crate) fn two_airline_response() -> ShoppingResponse {
    serde_json::from_value(json!({
        "OffersGroup": { "AirlineOffers": [
            {
                "Owner": "KL",
                "AirlineOffer": [
                    offer("KL", "KL-OFFER-0", vec![vec!["KL-FG1", "KL-SEG1"]]),
                    offer("KL", "KL-OFFER-1", vec![vec!["KL-FG1", "KL-SEG2"]]),
                    offer("KL", "KL-OFFER-2", vec![vec!["KL-FG1", "KL-SEG1", "KL-SEG2"]])
                ]
            },
            {
                "Owner": "QR",
                "AirlineOffer": [
                    offer("QR", "QR-OFFER-0", vec![vec!["QR-FG1", "QR-SEG1"]]),
                    offer("QR", "QR-OFFER-1", vec![
                        vec!["QR-FG1", "QR-SEG1"],
                        vec!["QR-FG1", "QR-FG2", "QR-SEG2"]
                    ]),
                    offer("QR", "QR-OFFER-2", vec![vec!["QR-FG2", "QR-SEG2"]])
                ]
            }
        ]},
        "DataLists": {
            "AnonymousTravelerList": { "AnonymousTraveler": [
                { "ObjectKey": "KL-T1", "PTC": { "value": "ADT" } },
                { "ObjectKey": "QR-T1", "PTC": { "value": "ADT" } }
            ]},
            "FlightSegmentList": { "FlightSegment": [
                { "SegmentKey": "KL-SEG1", "Departure": { "AirportCode": { "value": "AMS" } } },
                { "SegmentKey": "KL-SEG2", "Departure": { "AirportCode": { "value": "CDG" } } },
                { "SegmentKey": "QR-SEG1", "Departure": { "AirportCode": { "value": "DOH" } } },
                { "SegmentKey": "QR-SEG2", "Departure": { "AirportCode": { "value": "BKK" } } }
            ]},
            "FlightList": { "Flight": [
                { "FlightKey": "KL-F1", "SegmentReferences": { "value": "KL-SEG1 KL-SEG2" } },
                { "FlightKey": "QR-F1", "SegmentReferences": { "value": "QR-SEG1 QR-SEG2" } }
            ]},
            "OriginDestinationList": { "OriginDestination": [
                { "OriginDestinationKey": "KL-OD1" },
                { "OriginDestinationKey": "QR-OD1" }
            ]},
            "FareList": { "FareGroup": [
                { "ListKey": "KL-FG1", "FareBasisCode": { "Code": "YKL" } },
                { "ListKey": "QR-FG1", "FareBasisCode": { "Code": "YQR" } },
                { "ListKey": "QR-FG2", "FareBasisCode": { "Code": "BQR" } }
            ]},
            "CarryOnAllowanceList": { "CarryOnAllowance": [
                { "ListKey": "KL-CO1" },
                { "ListKey": "QR-CO1" }
            ]},
            "CheckedBagAllowanceList": { "CheckedBagAllowance": [
                { "ListKey": "KL-CB1" },
                { "ListKey": "QR-CB1" }
            ]}
        },
        "ShoppingResponseID": [
            { "Owner": "KL", "ResponseID": { "value": "SESSION-KL" } },
            { "Owner": "QR", "ResponseID": { "value": "SESSION-QR" } }
        ]
    }))
    .unwrap()
}

/// Single-airline response with no prefixed keys anywhere.
pub(crate) fn single_airline_response() -> ShoppingResponse {
    serde_json::from_value(json!({
        "OffersGroup": { "AirlineOffers": {
            "Owner": "LH",
            "AirlineOffer": [
                offer("LH", "OFFER-1", vec![vec!["FG1", "SEG1"]]),
                offer("LH", "OFFER-2", vec![vec!["FG1", "SEG2"]])
            ]
        }},
        "DataLists": {
            "AnonymousTravelerList": { "AnonymousTraveler": [{ "ObjectKey": "PAX1", "PTC": { "value": "ADT" } }] },
            "FlightSegmentList": { "FlightSegment": [
                { "SegmentKey": "SEG1" },
                { "SegmentKey": "SEG2" }
            ]},
            "FareList": { "FareGroup": [{ "ListKey": "FG1" }] }
        },
        "ShoppingResponseID": { "ResponseID": { "value": "SESSION-LH" } }
    }))
    .unwrap()
}
