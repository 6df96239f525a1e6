//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing (template match) → binding (request message)
//!     → rpc dispatch (backend method)
//!     → response.rs (reply → JSON) / error.rs (failure → status + JSON)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ErrorBody, GatewayError};
pub use request::X_REQUEST_ID;
pub use server::GatewayServer;
