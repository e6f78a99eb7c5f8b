use farelink_shared::airline::{split_prefixed_key, AirlineCode};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::response::{EntityKind, PricedResponse, ShoppingResponse};
use crate::{ScopeError, ScopeResult};

// ============================================================================
// Multi-airline detection
//
// The upstream schema has no airline-count field, so classification is
// inferred from composite `<CODE>-<suffix>` keys in the shared data lists.
// If the API ever grows an explicit indicator it should be read ahead of this
// scan, with the scan kept as the fallback for partially-prefixed responses.
// ============================================================================

/// Every `<CODE>-<suffix>` composite entity key in the data lists plus every
/// prefixed metadata key, in document order. Metadata keys cover both price
/// metadata and the per-airline session records.
fn prefixed_keys(response: &ShoppingResponse) -> Vec<(AirlineCode, String)> {
    let mut found = Vec::new();
    for kind in EntityKind::ALL {
        if kind == EntityKind::PriceMetadata {
            // Covered by the metadata-key scan below
            continue;
        }
        for entity in kind.source_entries(&response.data_lists, &response.metadata) {
            if let Some(key) = kind.entity_key(entity) {
                if let Some((code, _)) = split_prefixed_key(key) {
                    found.push((code, key.to_string()));
                }
            }
        }
    }
    collect_metadata_keys(&response.metadata, &mut found);
    found
}

/// Recursively collect every prefixed "MetadataKey" string.
fn collect_metadata_keys(value: &Value, found: &mut Vec<(AirlineCode, String)>) {
    match value {
        Value::Object(map) => {
            if let Some(key) = map.get("MetadataKey").and_then(Value::as_str) {
                if let Some((code, _)) = split_prefixed_key(key) {
                    found.push((code, key.to_string()));
                }
            }
            for nested in map.values() {
                collect_metadata_keys(nested, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_metadata_keys(item, found);
            }
        }
        _ => {}
    }
}

fn push_unique(codes: &mut Vec<AirlineCode>, code: AirlineCode) {
    if !codes.contains(&code) {
        codes.push(code);
    }
}

/// Distinct airline codes inferred from composite keys only, first-seen order.
fn prefixed_codes(response: &ShoppingResponse) -> Vec<AirlineCode> {
    let mut codes = Vec::new();
    for (code, _) in prefixed_keys(response) {
        push_unique(&mut codes, code);
    }
    codes
}

/// The distinct airline codes present in a response, first-seen order.
///
/// Composite keys are authoritative; when no key carries a prefix the offer
/// owners name the response's lone airline.
pub fn airline_codes(response: &ShoppingResponse) -> Vec<AirlineCode> {
    let mut codes = prefixed_codes(response);
    if codes.is_empty() {
        for group in &response.offers_group.airline_offers {
            if let Some(code) = group.owner_code() {
                push_unique(&mut codes, code);
            }
        }
    }
    codes
}

/// Whether a response bundles offers from several airlines.
///
/// The discriminant is multiplicity of *distinct* prefixed codes, not the
/// presence of prefixes: one airline's codes repeated everywhere is still a
/// single-airline response. Zero matches defaults to single-airline - a false
/// single is recoverable by the caller, a false multi wrongly splits data.
pub fn is_multi_airline(response: &ShoppingResponse) -> bool {
    let distinct = prefixed_codes(response).len();
    if distinct >= 2 {
        debug!(airlines = distinct, "classified response as multi-airline");
        true
    } else {
        false
    }
}

/// Composite data-list keys grouped by their owning airline.
pub fn references_by_airline(response: &ShoppingResponse) -> HashMap<AirlineCode, Vec<String>> {
    let mut map: HashMap<AirlineCode, Vec<String>> = HashMap::new();
    for (code, key) in prefixed_keys(response) {
        map.entry(code).or_default().push(key);
    }
    map
}

/// The single airline a pricing response was scoped to.
///
/// Read from the priced offers' owners and the data-list key prefixes; zero
/// or several distinct codes is an ownership failure, never a guess.
pub fn sole_airline(priced: &PricedResponse) -> ScopeResult<AirlineCode> {
    let mut codes = Vec::new();
    for offer in &priced.priced_flight_offers.offers {
        if let Some(code) = offer.owner_code() {
            push_unique(&mut codes, code);
        }
    }
    for session in &priced.shopping_response_ids {
        if let Some(code) = session.owner_code() {
            push_unique(&mut codes, code);
        }
    }
    for kind in EntityKind::ALL {
        for entity in kind.source_entries(&priced.data_lists, &priced.metadata) {
            if let Some((code, _)) = kind.entity_key(entity).and_then(split_prefixed_key) {
                push_unique(&mut codes, code);
            }
        }
    }

    match codes.len() {
        1 => Ok(codes.remove(0)),
        0 => Err(ScopeError::OwnershipUnresolved(
            "priced response names no owning airline".to_string(),
        )),
        n => Err(ScopeError::OwnershipUnresolved(format!(
            "priced response mixes {n} airlines: {}",
            codes
                .iter()
                .map(AirlineCode::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Shopping session ids announced through metadata records named for the
/// session, e.g. `{"MetadataKey": "KL-ShoppingResponseID", "value": "..."}`.
pub fn session_ids_from_metadata(metadata: &Value) -> Vec<(AirlineCode, String)> {
    let mut found = Vec::new();
    walk_metadata(metadata, &mut found);
    found
}

fn walk_metadata(value: &Value, found: &mut Vec<(AirlineCode, String)>) {
    match value {
        Value::Object(map) => {
            let key = map.get("MetadataKey").and_then(Value::as_str);
            let id = map
                .get("value")
                .or_else(|| map.get("Value"))
                .and_then(Value::as_str);
            if let (Some(key), Some(id)) = (key, id) {
                if let Some((code, suffix)) = split_prefixed_key(key) {
                    if suffix.to_ascii_lowercase().contains("shopping") {
                        found.push((code, id.to_string()));
                    }
                }
            }
            for nested in map.values() {
                walk_metadata(nested, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_metadata(item, found);
            }
        }
        _ => {}
    }
}
