pub mod builder;
pub mod pricing;
pub mod seats;
pub mod services;

pub use builder::{BuildError, OfferRef};
pub use pricing::{build_flight_price_request, FlightPriceRequest};
pub use seats::{build_seat_availability_request, SeatAvailabilityRequest};
pub use services::{build_service_list_request, ServiceListRequest};

#[cfg(test)]
pub(crate) mod fixtures;
