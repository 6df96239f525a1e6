//! Reference echo backend.
//!
//! Served by the binary and by the acceptance tests. It exercises every
//! binding feature of the gateway: path variables, scalar, enum and repeated
//! query parameters, wildcard and named bodies with both binding orders,
//! streaming replies and both failure kinds.

pub mod messages;
pub mod routes;
pub mod service;

pub use messages::{Echo, EchoType};
pub use routes::echo_routes;
pub use service::EchoService;
