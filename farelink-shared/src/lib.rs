pub mod airline;
pub mod carriers;
pub mod pii;

pub use airline::{is_airline_code, split_prefixed_key, AirlineCode};
pub use pii::Masked;
