use farelink_shared::airline::AirlineCode;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::index::{self, ResolvedOffer};
use crate::references::{AirlineContext, ReferenceExtractor};
use crate::response::{entries, EntityKind, ShoppingResponse};
use crate::ScopeResult;

// ============================================================================
// Shared scoping plumbing for the outbound request builders
// ============================================================================

/// The airline ownership marker plus that airline's own session id, attached
/// to every outbound request so the upstream API invokes the right backend
/// partition.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRef {
    #[serde(rename = "Owner")]
    pub owner: String,

    #[serde(rename = "ResponseID")]
    pub response_id: ResponseIdValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseIdValue {
    pub value: String,
}

impl SessionRef {
    pub fn new(owner: &AirlineCode, session_id: String) -> Self {
        Self {
            owner: owner.to_string(),
            response_id: ResponseIdValue { value: session_id },
        }
    }
}

/// Data lists copied from exactly one airline's context.
///
/// Construction only ever reads an `AirlineContext`, never the raw response,
/// which is what makes cross-airline leakage structurally impossible rather
/// than filtered after the fact.
#[derive(Debug, Clone, Default)]
pub struct ScopedDataLists {
    lists: Vec<(EntityKind, Vec<Value>)>,
}

impl ScopedDataLists {
    /// Copy the requested entity kinds out of one airline's tables,
    /// preserving document order. Empty tables are omitted entirely.
    pub fn from_context(context: &AirlineContext, kinds: &[EntityKind]) -> Self {
        let mut lists = Vec::new();
        for &kind in kinds {
            let table = context.tables.table(kind);
            if table.is_empty() {
                continue;
            }
            lists.push((kind, table.values().cloned().collect()));
        }
        Self { lists }
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Every entity key present in the copied lists; the no-leakage checks
    /// in tests assert against this.
    pub fn entity_keys(&self) -> Vec<String> {
        self.lists
            .iter()
            .flat_map(|(kind, items)| {
                items
                    .iter()
                    .filter_map(|entity| kind.entity_key(entity))
                    .map(str::to_string)
            })
            .collect()
    }
}

impl Serialize for ScopedDataLists {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Emits the upstream wrapper shape:
        // {"FlightSegmentList": {"FlightSegment": [ ... ]}, ...}
        struct ItemList<'a> {
            field: &'static str,
            items: &'a [Value],
        }

        impl Serialize for ItemList<'_> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                let mut inner = serializer.serialize_map(Some(1))?;
                inner.serialize_entry(self.field, self.items)?;
                inner.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.lists.len()))?;
        for (kind, items) in &self.lists {
            let wrapped = ItemList {
                field: kind.item_field(),
                items,
            };
            map.serialize_entry(kind.list_field(), &wrapped)?;
        }
        map.end()
    }
}

/// A selection resolved to its offer, owning airline context and session.
#[derive(Debug)]
pub struct ScopedOffer<'a> {
    pub resolved: ResolvedOffer<'a>,
    pub context: &'a AirlineContext,
    pub session: SessionRef,
}

/// Steps 1-2 and 4 of every index-based builder: resolve the owning airline
/// for a global offer index, fetch that airline's context and attach its own
/// session id. Fails rather than defaulting when ownership cannot be
/// resolved.
pub fn scope_offer<'a>(
    response: &'a ShoppingResponse,
    extractor: &'a ReferenceExtractor,
    selection: i64,
) -> ScopeResult<ScopedOffer<'a>> {
    let resolved = index::resolve(response, selection)?;
    let context = extractor.context_for(&resolved.airline)?;
    let session_id = extractor.shopping_response_id(Some(&resolved.airline))?;
    debug!(
        selection,
        airline = resolved.airline.as_str(),
        "scoped selection to one airline"
    );
    Ok(ScopedOffer {
        session: SessionRef::new(&resolved.airline, session_id),
        resolved,
        context,
    })
}

/// Entity references reachable from an offer's priced detail, deduped by
/// identity key in first-seen order. A fare group reachable from several
/// offer-price lines appears exactly once.
pub fn collect_refs(priced: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    walk_refs(priced, &mut seen, &mut refs);
    refs
}

fn walk_refs(value: &Value, seen: &mut HashSet<String>, refs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (field, nested) in map {
                if field == "refs" {
                    for item in entries(nested) {
                        if let Some(key) = item.as_str() {
                            if seen.insert(key.to_string()) {
                                refs.push(key.to_string());
                            }
                        }
                    }
                } else if field.ends_with("Ref") {
                    if let Some(key) = nested.as_str() {
                        if seen.insert(key.to_string()) {
                            refs.push(key.to_string());
                        }
                    }
                }
                walk_refs(nested, seen, refs);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_refs(item, seen, refs);
            }
        }
        _ => {}
    }
}
