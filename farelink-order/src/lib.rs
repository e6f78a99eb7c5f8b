pub mod create;
pub mod models;

pub use create::{build_order_create_request, OrderBuildError};
pub use models::{OrderCreateRequest, PassengerSpec};
