use chrono::NaiveDate;
use farelink_core::scope::{ResponseIdValue, ScopedDataLists, SessionRef};
use farelink_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied passenger details for order creation. Name and contact
/// fields are masked so they cannot leak through Debug-formatted logs.
#[derive(Debug, Clone, Deserialize)]
pub struct PassengerSpec {
    /// Traveler key the passenger answers, e.g. "QR-T1".
    pub traveler_ref: String,

    /// Passenger type code: ADT, CHD, INF.
    pub ptc: String,

    #[serde(default)]
    pub title: Option<String>,

    pub given_name: Masked<String>,
    pub surname: Masked<String>,
    pub birth_date: NaiveDate,

    #[serde(default)]
    pub email: Option<Masked<String>>,

    #[serde(default)]
    pub phone: Option<Masked<String>>,
}

/// Outbound order-creation request, scoped to the one airline the prior
/// pricing response was narrowed to.
#[derive(Debug, Serialize)]
pub struct OrderCreateRequest {
    #[serde(rename = "Query")]
    pub query: OrderQuery,

    #[serde(rename = "DataLists", skip_serializing_if = "ScopedDataLists::is_empty")]
    pub data_lists: ScopedDataLists,

    #[serde(rename = "ShoppingResponseID")]
    pub shopping_response_id: SessionRef,
}

impl OrderCreateRequest {
    pub fn owner(&self) -> &str {
        &self.shopping_response_id.owner
    }
}

#[derive(Debug, Serialize)]
pub struct OrderQuery {
    #[serde(rename = "Order")]
    pub order: OrderSpec,

    #[serde(rename = "Passengers")]
    pub passengers: PassengerList,

    /// Payment block is passed through untouched; card validation is the
    /// payment collaborator's concern.
    #[serde(rename = "Payments", skip_serializing_if = "Option::is_none")]
    pub payments: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct OrderSpec {
    #[serde(rename = "Offer")]
    pub offers: Vec<OrderOfferRef>,
}

#[derive(Debug, Serialize)]
pub struct OrderOfferRef {
    #[serde(rename = "OfferID")]
    pub offer_id: ResponseIdValue,

    #[serde(rename = "Owner")]
    pub owner: String,

    #[serde(rename = "OfferItems", skip_serializing_if = "Vec::is_empty")]
    pub offer_items: Vec<OrderOfferItem>,
}

#[derive(Debug, Serialize)]
pub struct OrderOfferItem {
    #[serde(rename = "OfferItemID")]
    pub offer_item_id: String,
}

#[derive(Debug, Serialize)]
pub struct PassengerList {
    #[serde(rename = "Passenger")]
    pub items: Vec<PassengerOut>,
}

#[derive(Debug, Serialize)]
pub struct PassengerOut {
    #[serde(rename = "ObjectKey")]
    pub object_key: String,

    #[serde(rename = "PTC")]
    pub ptc: String,

    #[serde(rename = "Name")]
    pub name: PassengerName,

    #[serde(rename = "BirthDate")]
    pub birth_date: NaiveDate,

    #[serde(rename = "Contacts", skip_serializing_if = "Option::is_none")]
    pub contacts: Option<PassengerContacts>,
}

#[derive(Debug, Serialize)]
pub struct PassengerName {
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "Given")]
    pub given: Vec<Masked<String>>,

    #[serde(rename = "Surname")]
    pub surname: Masked<String>,
}

#[derive(Debug, Serialize)]
pub struct PassengerContacts {
    #[serde(rename = "EmailContact", skip_serializing_if = "Option::is_none")]
    pub email: Option<Masked<String>>,

    #[serde(rename = "PhoneContact", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Masked<String>>,
}

impl From<&PassengerSpec> for PassengerOut {
    fn from(spec: &PassengerSpec) -> Self {
        let contacts = if spec.email.is_some() || spec.phone.is_some() {
            Some(PassengerContacts {
                email: spec.email.clone(),
                phone: spec.phone.clone(),
            })
        } else {
            None
        };
        Self {
            object_key: spec.traveler_ref.clone(),
            ptc: spec.ptc.clone(),
            name: PassengerName {
                title: spec.title.clone(),
                given: vec![spec.given_name.clone()],
                surname: spec.surname.clone(),
            },
            birth_date: spec.birth_date,
            contacts,
        }
    }
}
