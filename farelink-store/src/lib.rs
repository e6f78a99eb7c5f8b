pub mod app_config;
pub mod gateway;
pub mod response_store;

pub use gateway::{BearerToken, GatewayError, SupplierGateway};
pub use response_store::{InMemoryResponseStore, ResponseStore, StoreError};
