//! Response encoding.
//!
//! # Responsibilities
//! - Turn a backend reply into the JSON response body
//! - Wrap it under the route's response field, when declared
//!
//! # Design Decisions
//! - Sequences always encode as arrays; an empty one is `[]`, never omitted

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};

use crate::rpc::Reply;

/// Encode `reply`, optionally wrapped under `field`.
pub fn encode_reply(reply: Reply, field: Option<&str>) -> Value {
    let value = match reply {
        Reply::Message(message) => message,
        Reply::Sequence(items) => Value::Array(items),
    };

    match field {
        Some(field) => {
            let mut envelope = Map::new();
            envelope.insert(field.to_string(), value);
            Value::Object(envelope)
        }
        None => value,
    }
}

/// 200 response carrying the encoded reply.
pub fn reply_response(reply: Reply, field: Option<&str>) -> Response {
    (StatusCode::OK, Json(encode_reply(reply, field))).into_response()
}
