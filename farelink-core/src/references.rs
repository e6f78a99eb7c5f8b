use farelink_shared::airline::{split_prefixed_key, AirlineCode};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::detect;
use crate::response::{EntityKind, PricedResponse, SessionId, ShoppingResponse};
use crate::{ScopeError, ScopeResult};

/// Ordered entity-key -> record tables, one per referenceable entity type.
/// Insertion order is document order, which keeps scoped payloads and
/// dedup deterministic.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub travelers: IndexMap<String, Value>,
    pub segments: IndexMap<String, Value>,
    pub flights: IndexMap<String, Value>,
    pub origin_destinations: IndexMap<String, Value>,
    pub fare_groups: IndexMap<String, Value>,
    pub carry_on_allowances: IndexMap<String, Value>,
    pub checked_bag_allowances: IndexMap<String, Value>,
    pub services: IndexMap<String, Value>,
    pub price_metadata: IndexMap<String, Value>,
}

impl ReferenceTables {
    pub fn table(&self, kind: EntityKind) -> &IndexMap<String, Value> {
        match kind {
            EntityKind::Travelers => &self.travelers,
            EntityKind::Segments => &self.segments,
            EntityKind::Flights => &self.flights,
            EntityKind::OriginDestinations => &self.origin_destinations,
            EntityKind::FareGroups => &self.fare_groups,
            EntityKind::CarryOnAllowances => &self.carry_on_allowances,
            EntityKind::CheckedBagAllowances => &self.checked_bag_allowances,
            EntityKind::Services => &self.services,
            EntityKind::PriceMetadata => &self.price_metadata,
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut IndexMap<String, Value> {
        match kind {
            EntityKind::Travelers => &mut self.travelers,
            EntityKind::Segments => &mut self.segments,
            EntityKind::Flights => &mut self.flights,
            EntityKind::OriginDestinations => &mut self.origin_destinations,
            EntityKind::FareGroups => &mut self.fare_groups,
            EntityKind::CheckedBagAllowances => &mut self.checked_bag_allowances,
            EntityKind::CarryOnAllowances => &mut self.carry_on_allowances,
            EntityKind::Services => &mut self.services,
            EntityKind::PriceMetadata => &mut self.price_metadata,
        }
    }

    pub fn insert(&mut self, kind: EntityKind, key: String, entity: Value) {
        self.table_mut(kind).insert(key, entity);
    }

    pub fn get(&self, kind: EntityKind, key: &str) -> Option<&Value> {
        self.table(kind).get(key)
    }

    pub fn contains(&self, kind: EntityKind, key: &str) -> bool {
        self.table(kind).contains_key(key)
    }

    /// Total entries across all tables.
    pub fn len(&self) -> usize {
        EntityKind::ALL.iter().map(|&kind| self.table(kind).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every key across all tables; used by leakage checks in tests.
    pub fn all_keys(&self) -> Vec<&str> {
        EntityKind::ALL
            .iter()
            .flat_map(|&kind| self.table(kind).keys())
            .map(String::as_str)
            .collect()
    }
}

/// One airline's slice of the response: its code, its shopping session id and
/// only its reference tables. Every scoped request is built from exactly one
/// of these.
#[derive(Debug, Clone)]
pub struct AirlineContext {
    /// `None` only for a single-airline response that names no airline
    /// anywhere; builders resolve ownership before touching the context.
    pub airline: Option<AirlineCode>,
    pub shopping_response_id: Option<String>,
    pub tables: ReferenceTables,
}

/// Per-response reference extraction.
///
/// An instance is scoped to exactly one response document: the single pass
/// over the data lists runs at construction and every later lookup is O(1).
/// The cache lives in the instance, never in process globals, so unrelated
/// responses cannot bleed into each other.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    multi: bool,
    contexts: Vec<AirlineContext>,
}

impl ReferenceExtractor {
    pub fn for_shopping(response: &ShoppingResponse) -> Self {
        let multi = detect::is_multi_airline(response);
        let codes = detect::airline_codes(response);
        Self::build(
            multi,
            codes,
            &response.data_lists,
            &response.metadata,
            &response.shopping_response_ids,
        )
    }

    /// Extraction over a pricing response already narrowed to one airline.
    pub fn for_priced(response: &PricedResponse) -> ScopeResult<Self> {
        let airline = detect::sole_airline(response)?;
        Ok(Self::build(
            false,
            vec![airline],
            &response.data_lists,
            &response.metadata,
            &response.shopping_response_ids,
        ))
    }

    fn build(
        multi: bool,
        codes: Vec<AirlineCode>,
        data_lists: &Value,
        metadata: &Value,
        session_ids: &[SessionId],
    ) -> Self {
        let meta_sessions = detect::session_ids_from_metadata(metadata);
        let session_for = |code: &AirlineCode| -> Option<String> {
            session_ids
                .iter()
                .find(|s| s.owner_code().as_ref() == Some(code))
                .and_then(|s| s.id())
                .map(str::to_string)
                .or_else(|| {
                    meta_sessions
                        .iter()
                        .find(|(c, _)| c == code)
                        .map(|(_, id)| id.clone())
                })
        };

        let mut contexts: Vec<AirlineContext> = Vec::new();
        if multi {
            for code in &codes {
                contexts.push(AirlineContext {
                    airline: Some(code.clone()),
                    shopping_response_id: session_for(code),
                    tables: ReferenceTables::default(),
                });
            }
            for kind in EntityKind::ALL {
                for entity in kind.source_entries(data_lists, metadata) {
                    let Some(key) = kind.entity_key(entity) else {
                        continue;
                    };
                    // An entity whose key has no parseable prefix belongs to
                    // no airline here: not referenceable, never guessed.
                    let Some((code, _)) = split_prefixed_key(key) else {
                        continue;
                    };
                    if let Some(context) = contexts
                        .iter_mut()
                        .find(|c| c.airline.as_ref() == Some(&code))
                    {
                        context.tables.insert(kind, key.to_string(), entity.clone());
                    }
                }
            }
        } else {
            let airline = codes.first().cloned();
            let session = session_ids
                .iter()
                .find_map(|s| s.id())
                .map(str::to_string)
                .or_else(|| airline.as_ref().and_then(|code| session_for(code)));
            let mut tables = ReferenceTables::default();
            for kind in EntityKind::ALL {
                for entity in kind.source_entries(data_lists, metadata) {
                    if let Some(key) = kind.entity_key(entity) {
                        tables.insert(kind, key.to_string(), entity.clone());
                    }
                }
            }
            contexts.push(AirlineContext {
                airline,
                shopping_response_id: session,
                tables,
            });
        }

        debug!(
            multi,
            airlines = contexts.len(),
            entries = contexts.iter().map(|c| c.tables.len()).sum::<usize>(),
            "extracted reference tables"
        );
        Self { multi, contexts }
    }

    pub fn is_multi_airline(&self) -> bool {
        self.multi
    }

    /// Contexts in response order. Single-airline responses have exactly one.
    pub fn contexts(&self) -> &[AirlineContext] {
        &self.contexts
    }

    /// The context a scoped request must be built from.
    ///
    /// Multi-airline: the named airline's slice, or an ownership failure.
    /// Single-airline: the lone context regardless of the argument.
    pub fn context_for(&self, airline: &AirlineCode) -> ScopeResult<&AirlineContext> {
        if self.multi {
            self.find(airline).ok_or_else(|| {
                ScopeError::OwnershipUnresolved(format!(
                    "no reference data extracted for airline {airline}"
                ))
            })
        } else {
            self.contexts.first().ok_or_else(|| {
                ScopeError::OwnershipUnresolved("response carries no reference data".to_string())
            })
        }
    }

    /// One airline's context, `None` on single-airline responses where no
    /// per-airline partitioning exists.
    pub fn airline_references(&self, airline: &AirlineCode) -> Option<&AirlineContext> {
        if self.multi {
            self.find(airline)
        } else {
            None
        }
    }

    /// Look up one entity record by key within its owning airline's table.
    pub fn reference_by_key(&self, kind: EntityKind, key: &str) -> Option<&Value> {
        if self.multi {
            let (code, _) = split_prefixed_key(key)?;
            self.find(&code)?.tables.get(kind, key)
        } else {
            self.contexts.first()?.tables.get(kind, key)
        }
    }

    /// The shopping session id for one airline, or the response's sole id.
    ///
    /// Calling without an airline on a multi-airline response only succeeds
    /// when every airline carries the same id; differing ids fail loudly
    /// rather than silently picking one.
    pub fn shopping_response_id(&self, airline: Option<&AirlineCode>) -> ScopeResult<String> {
        if let Some(code) = airline {
            let context = self.context_for(code)?;
            return context
                .shopping_response_id
                .clone()
                .ok_or_else(|| ScopeError::MissingShoppingSession(code.to_string()));
        }

        let mut distinct: Vec<&str> = Vec::new();
        for context in &self.contexts {
            if let Some(id) = context.shopping_response_id.as_deref() {
                if !distinct.contains(&id) {
                    distinct.push(id);
                }
            }
        }
        match distinct.len() {
            1 => Ok(distinct[0].to_string()),
            0 => Err(ScopeError::MissingShoppingSession("response".to_string())),
            n => Err(ScopeError::AmbiguousShoppingSession(n)),
        }
    }

    fn find(&self, airline: &AirlineCode) -> Option<&AirlineContext> {
        self.contexts
            .iter()
            .find(|c| c.airline.as_ref() == Some(airline))
    }
}
