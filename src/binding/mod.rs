//! Parameter binding subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route + raw request parts
//!     → query.rs (declared query parameters)
//!     → body.rs / field_path.rs (body and path variables, in the route's order)
//!     → PendingMessage (JSON tree of the request under construction)
//!     → typed decode into the route's request message
//! ```
//!
//! # Design Decisions
//! - Field paths are resolved against static schemas at registration
//! - The request is assembled as a JSON tree and decoded once, so the
//!   JSON codec stays the single source of typed decoding
//! - Any failure discards the partially bound message; nothing is dispatched

pub mod body;
pub mod field_path;
pub mod query;
pub mod schema;

use serde_json::{Map, Value};

pub use body::{BindingOrder, BodyBinding};
pub use field_path::{CoercionError, FieldPath, FieldPathError};
pub use query::{QueryBinding, QueryParam};
pub use schema::{EnumDescriptor, FieldDescriptor, FieldKind, MessageSchema, RequestMessage};

/// Client-side failure while binding a request. Always reported as 400.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("{0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("Expected a JSON object for {target}")]
    BodyNotObject { target: String },

    #[error("{0}")]
    Decode(#[source] serde_json::Error),
}

/// A request message under construction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PendingMessage {
    fields: Map<String, Value>,
}

impl PendingMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// Decode into the typed request message.
    pub fn decode<M: RequestMessage>(self) -> Result<M, BindError> {
        serde_json::from_value(Value::Object(self.fields)).map_err(BindError::Decode)
    }
}
