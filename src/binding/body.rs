//! Request body binding.
//!
//! # Responsibilities
//! - Parse the JSON body
//! - Place it at the root (wildcard) or under one field (named)
//!
//! # Design Decisions
//! - Empty bodies read as `{}`
//! - JSON `null` means "absent", so nulls are pruned before placement
//! - Unknown keys are carried along and dropped by the typed decode
//! - A wildcard body merges into the message: only the fields it supplies
//!   replace what query or path binding already set

use serde_json::{Map, Value};

use crate::binding::field_path::FieldPath;
use crate::binding::BindError;

/// Where the request body goes.
#[derive(Debug, Clone, Default)]
pub enum BodyBinding {
    /// Body is not read.
    #[default]
    None,
    /// The whole body is the request message, merged over earlier bindings.
    Wildcard,
    /// The body is one field of the request message.
    Field(FieldPath),
}

/// Order in which the body and path variables are applied.
///
/// Whichever runs last wins for a field both of them target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindingOrder {
    /// Path variables overwrite what the body supplied.
    #[default]
    BodyThenPath,
    /// The body replaces its target wholesale, including path-bound values.
    PathThenBody,
}

/// Parse raw body bytes.
pub fn parse_body(bytes: &[u8]) -> Result<Value, BindError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    let mut value: Value = serde_json::from_slice(bytes).map_err(BindError::MalformedBody)?;
    prune_nulls(&mut value);
    Ok(value)
}

impl BodyBinding {
    /// Place a parsed body into the message under construction.
    pub fn apply(&self, body: Value, root: &mut Map<String, Value>) -> Result<(), BindError> {
        match self {
            BodyBinding::None => Ok(()),
            BodyBinding::Wildcard => match body {
                Value::Object(map) => {
                    merge(root, map);
                    Ok(())
                }
                _ => Err(BindError::BodyNotObject {
                    target: "request".to_string(),
                }),
            },
            BodyBinding::Field(path) => {
                if path.leaf().kind.is_message() && !path.leaf().repeated && !body.is_object() {
                    return Err(BindError::BodyNotObject {
                        target: path.as_str().to_string(),
                    });
                }
                path.assign(root, body);
                Ok(())
            }
        }
    }
}

/// Deep-merge `overlay` into `target`. Objects merge key by key; any other
/// value, arrays included, replaces what was there.
fn merge(target: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(nested) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => merge(existing, nested),
                _ => {
                    target.insert(key, Value::Object(nested));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}
