pub mod detect;
pub mod index;
pub mod references;
pub mod response;
pub mod scope;

pub use index::ResolvedOffer;
pub use references::{AirlineContext, ReferenceExtractor, ReferenceTables};
pub use response::{EntityKind, PricedResponse, ShoppingResponse};
pub use scope::{ScopedDataLists, SessionRef};

/// Failures of reference resolution and payload scoping.
///
/// These are deliberately distinct and inspectable: the route layer maps each
/// to a 4xx response. None of them may be recovered by substituting a
/// placeholder airline or an empty entity list - a request that looks valid
/// but references the wrong airline's data corrupts the booking.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("offer index {index} is out of range for {total} priced offers")]
    IndexOutOfRange { index: i64, total: usize },

    #[error("owning airline could not be resolved: {0}")]
    OwnershipUnresolved(String),

    #[error("{airline} tables carry no {kind} entry for key {key:?}")]
    ReferenceMissing {
        airline: String,
        kind: &'static str,
        key: String,
    },

    #[error("no shopping session id found for {0}")]
    MissingShoppingSession(String),

    #[error("{0} airlines carry distinct shopping session ids; the owning airline must be named")]
    AmbiguousShoppingSession(usize),
}

pub type ScopeResult<T> = Result<T, ScopeError>;
