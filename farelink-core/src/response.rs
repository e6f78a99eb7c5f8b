use chrono::{DateTime, Utc};
use farelink_shared::airline::AirlineCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ============================================================================
// Upstream shopping response model
//
// The schema is owned by the distribution API, not by us: typed structs cover
// the skeleton this layer navigates, everything else stays serde_json::Value
// and is copied into outbound requests without modification.
// ============================================================================

/// Deserializer for regions the upstream emits as either a single object or a
/// list, depending on cardinality. Downstream code always sees a Vec.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    entries(&raw)
        .into_iter()
        .map(|item| serde_json::from_value(item.clone()).map_err(serde::de::Error::custom))
        .collect()
}

/// Normalize an untyped region to an ordered sequence: null and absent become
/// empty, a list yields its items, anything else is a single entry.
pub fn entries(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// A code field the upstream emits either bare ("KL") or tagged
/// (`{"value": "KL"}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CodeValue {
    Plain(String),
    Tagged { value: String },
}

impl CodeValue {
    pub fn as_str(&self) -> &str {
        match self {
            CodeValue::Plain(s) => s,
            CodeValue::Tagged { value } => value,
        }
    }
}

/// The unmodified shopping response. Never mutated; every downstream request
/// is carved out of it by reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShoppingResponse {
    #[serde(rename = "OffersGroup", default)]
    pub offers_group: OffersGroup,

    /// Shared reference data, keyed by entity type. Externally owned, so it
    /// stays untyped; `EntityKind` knows the field names.
    #[serde(rename = "DataLists", default)]
    pub data_lists: Value,

    #[serde(rename = "ShoppingResponseID", default, deserialize_with = "one_or_many")]
    pub shopping_response_ids: Vec<SessionId>,

    #[serde(rename = "Metadata", default)]
    pub metadata: Value,
}

impl ShoppingResponse {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffersGroup {
    #[serde(rename = "AirlineOffers", default, deserialize_with = "one_or_many")]
    pub airline_offers: Vec<AirlineOfferGroup>,
}

/// One airline's block of offers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirlineOfferGroup {
    #[serde(rename = "Owner", default)]
    pub owner: Option<CodeValue>,

    #[serde(rename = "AirlineOffer", default, deserialize_with = "one_or_many")]
    pub offers: Vec<Offer>,

    #[serde(rename = "TotalOfferQuantity", default)]
    pub total_offer_quantity: Option<i64>,
}

impl AirlineOfferGroup {
    /// The code owning this group: the group-level owner, else the first
    /// offer that names one.
    pub fn owner_code(&self) -> Option<AirlineCode> {
        if let Some(code) = self.owner.as_ref().and_then(|c| AirlineCode::parse(c.as_str())) {
            return Some(code);
        }
        self.offers
            .iter()
            .find_map(|offer| offer.owner_code())
    }
}

/// One priced itinerary option. Read-only: the core indexes and filters
/// offers, never edits their content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Offer {
    #[serde(rename = "OfferID", default)]
    pub offer_id: Option<OfferId>,

    #[serde(rename = "TotalPrice", default)]
    pub total_price: Option<Value>,

    #[serde(rename = "TimeLimits", default)]
    pub time_limits: Option<TimeLimits>,

    /// Price breakdown with entity references. Walked for refs, never edited.
    #[serde(rename = "PricedOffer", default)]
    pub priced_offer: Value,
}

impl Offer {
    /// Only priced entries are bookable; an unpriced entry never consumes a
    /// global index slot.
    pub fn is_priced(&self) -> bool {
        self.total_price.is_some()
    }

    pub fn owner_code(&self) -> Option<AirlineCode> {
        self.offer_id
            .as_ref()
            .and_then(|id| id.owner.as_deref())
            .and_then(AirlineCode::parse)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.time_limits
            .as_ref()
            .and_then(|tl| tl.offer_expiration.as_ref())
            .map(|exp| exp.date_time)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|at| at <= now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferId {
    pub value: String,
    #[serde(rename = "Owner", default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeLimits {
    #[serde(rename = "OfferExpiration", default)]
    pub offer_expiration: Option<OfferExpiration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferExpiration {
    #[serde(rename = "DateTime")]
    pub date_time: DateTime<Utc>,
}

/// A shopping session identifier, optionally tagged with its owning airline
/// in multi-airline responses.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionId {
    #[serde(rename = "Owner", default)]
    pub owner: Option<String>,

    #[serde(rename = "ResponseID", default)]
    pub response_id: Option<CodeValue>,

    #[serde(rename = "value", default)]
    pub value: Option<String>,
}

impl SessionId {
    pub fn id(&self) -> Option<&str> {
        self.response_id
            .as_ref()
            .map(|r| r.as_str())
            .or(self.value.as_deref())
    }

    pub fn owner_code(&self) -> Option<AirlineCode> {
        self.owner.as_deref().and_then(AirlineCode::parse)
    }
}

// ============================================================================
// Priced (flight-price) response: input to order creation
// ============================================================================

/// A pricing response that has already been narrowed to one airline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricedResponse {
    #[serde(rename = "PricedFlightOffers", default)]
    pub priced_flight_offers: PricedFlightOffers,

    #[serde(rename = "DataLists", default)]
    pub data_lists: Value,

    #[serde(rename = "ShoppingResponseID", default, deserialize_with = "one_or_many")]
    pub shopping_response_ids: Vec<SessionId>,

    #[serde(rename = "Metadata", default)]
    pub metadata: Value,
}

impl PricedResponse {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricedFlightOffers {
    #[serde(rename = "PricedFlightOffer", default, deserialize_with = "one_or_many")]
    pub offers: Vec<PricedFlightOffer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricedFlightOffer {
    #[serde(rename = "OfferID", default)]
    pub offer_id: Option<OfferId>,

    /// Per-traveler price lines; walked for entity references.
    #[serde(rename = "OfferPrice", default, deserialize_with = "one_or_many")]
    pub offer_prices: Vec<Value>,
}

impl PricedFlightOffer {
    pub fn owner_code(&self) -> Option<AirlineCode> {
        self.offer_id
            .as_ref()
            .and_then(|id| id.owner.as_deref())
            .and_then(AirlineCode::parse)
    }
}

// ============================================================================
// Referenceable entity types
// ============================================================================

/// The entity types the shared data lists can reference, with the field names
/// the upstream schema uses for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Travelers,
    Segments,
    Flights,
    OriginDestinations,
    FareGroups,
    CarryOnAllowances,
    CheckedBagAllowances,
    Services,
    PriceMetadata,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Travelers,
        EntityKind::Segments,
        EntityKind::Flights,
        EntityKind::OriginDestinations,
        EntityKind::FareGroups,
        EntityKind::CarryOnAllowances,
        EntityKind::CheckedBagAllowances,
        EntityKind::Services,
        EntityKind::PriceMetadata,
    ];

    /// Wrapper field inside `DataLists`.
    pub fn list_field(self) -> &'static str {
        match self {
            EntityKind::Travelers => "AnonymousTravelerList",
            EntityKind::Segments => "FlightSegmentList",
            EntityKind::Flights => "FlightList",
            EntityKind::OriginDestinations => "OriginDestinationList",
            EntityKind::FareGroups => "FareList",
            EntityKind::CarryOnAllowances => "CarryOnAllowanceList",
            EntityKind::CheckedBagAllowances => "CheckedBagAllowanceList",
            EntityKind::Services => "ServiceList",
            EntityKind::PriceMetadata => "PriceMetadatas",
        }
    }

    /// Item field inside the wrapper.
    pub fn item_field(self) -> &'static str {
        match self {
            EntityKind::Travelers => "AnonymousTraveler",
            EntityKind::Segments => "FlightSegment",
            EntityKind::Flights => "Flight",
            EntityKind::OriginDestinations => "OriginDestination",
            EntityKind::FareGroups => "FareGroup",
            EntityKind::CarryOnAllowances => "CarryOnAllowance",
            EntityKind::CheckedBagAllowances => "CheckedBagAllowance",
            EntityKind::Services => "Service",
            EntityKind::PriceMetadata => "PriceMetadata",
        }
    }

    /// Field carrying the entity's reference key.
    pub fn key_field(self) -> &'static str {
        match self {
            EntityKind::Travelers | EntityKind::Services => "ObjectKey",
            EntityKind::Segments => "SegmentKey",
            EntityKind::Flights => "FlightKey",
            EntityKind::OriginDestinations => "OriginDestinationKey",
            EntityKind::FareGroups
            | EntityKind::CarryOnAllowances
            | EntityKind::CheckedBagAllowances => "ListKey",
            EntityKind::PriceMetadata => "MetadataKey",
        }
    }

    /// Short label for error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Travelers => "traveler",
            EntityKind::Segments => "segment",
            EntityKind::Flights => "flight",
            EntityKind::OriginDestinations => "origin-destination",
            EntityKind::FareGroups => "fare group",
            EntityKind::CarryOnAllowances => "carry-on allowance",
            EntityKind::CheckedBagAllowances => "checked-bag allowance",
            EntityKind::Services => "service",
            EntityKind::PriceMetadata => "price metadata",
        }
    }

    /// All records of this kind in a response, in document order. Price
    /// metadata lives under `Metadata`, everything else under `DataLists`.
    pub fn source_entries<'a>(self, data_lists: &'a Value, metadata: &'a Value) -> Vec<&'a Value> {
        if self == EntityKind::PriceMetadata {
            return entries(&metadata["Other"]["OtherMetadata"])
                .into_iter()
                .flat_map(|other| entries(&other["PriceMetadatas"]["PriceMetadata"]))
                .collect();
        }
        entries(&data_lists[self.list_field()][self.item_field()])
    }

    /// The reference key of one record, when present and a string.
    pub fn entity_key<'a>(self, entity: &'a Value) -> Option<&'a str> {
        entity[self.key_field()].as_str()
    }
}
