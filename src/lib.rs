//! REST-to-RPC transcoding gateway.
//!
//! Maps HTTP requests onto backend RPC methods using declarative routes,
//! binds path, query and body input into typed request messages, and turns
//! replies and failures back into JSON responses.

pub mod binding;
pub mod config;
pub mod echo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod rpc;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::{Route, RouteTable};
