//! Field path resolution and string coercion.
//!
//! # Responsibilities
//! - Resolve dotted paths (`echo.id`) against a message schema
//! - Coerce raw strings (path segments, query values) to the field's kind
//! - Write coerced values into the message under construction
//!
//! # Design Decisions
//! - Resolution happens at route registration; an unresolvable path is a
//!   startup error, never a request error
//! - Paths cannot address through repeated fields or scalars
//! - Coercion failures echo the offending literal verbatim

use serde_json::{Map, Number, Value};

use crate::binding::schema::{FieldDescriptor, FieldKind, MessageSchema};

/// Error resolving a field path against a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldPathError {
    #[error("field path is empty")]
    Empty,

    #[error("message {message} has no field named '{field}' (in path '{path}')")]
    UnknownField {
        message: &'static str,
        field: String,
        path: String,
    },

    #[error("field '{field}' is not addressable in path '{path}'")]
    NotAddressable { field: &'static str, path: String },
}

/// A raw string that could not be coerced to its field's kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("For input string: \"{literal}\"")]
pub struct CoercionError {
    pub literal: String,
}

impl CoercionError {
    pub fn new(literal: &str) -> Self {
        Self {
            literal: literal.to_string(),
        }
    }
}

/// A dotted field path resolved against a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<&'static str>,
    leaf: &'static FieldDescriptor,
}

impl FieldPath {
    /// Resolve `path` against `schema`.
    pub fn resolve(schema: &'static MessageSchema, path: &str) -> Result<Self, FieldPathError> {
        if path.is_empty() {
            return Err(FieldPathError::Empty);
        }

        let mut current = schema;
        let mut segments = Vec::new();
        let mut parts = path.split('.').peekable();

        while let Some(part) = parts.next() {
            let field = current
                .field(part)
                .ok_or_else(|| FieldPathError::UnknownField {
                    message: current.name,
                    field: part.to_string(),
                    path: path.to_string(),
                })?;
            segments.push(field.name);

            if parts.peek().is_none() {
                return Ok(Self {
                    raw: path.to_string(),
                    segments,
                    leaf: field,
                });
            }

            current = match field.kind {
                FieldKind::Message(inner) if !field.repeated => inner,
                _ => {
                    return Err(FieldPathError::NotAddressable {
                        field: field.name,
                        path: path.to_string(),
                    })
                }
            };
        }

        Err(FieldPathError::Empty)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Descriptor of the addressed field.
    pub fn leaf(&self) -> &'static FieldDescriptor {
        self.leaf
    }

    /// Store `value` at this path, creating intermediate objects as needed.
    ///
    /// Whatever was previously at the path is replaced.
    pub fn assign(&self, root: &mut Map<String, Value>, value: Value) {
        let (last, parents) = match self.segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut target = root;
        for segment in parents {
            let slot = target
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };
            target = map;
        }
        target.insert(last.to_string(), value);
    }

    /// Bind raw occurrences of a value to this path.
    ///
    /// Blank occurrences are skipped. Repeated fields append every remaining
    /// occurrence in order; singular fields take the last one. When nothing
    /// is left the field is untouched and keeps its default.
    pub fn bind<'a, I>(&self, root: &mut Map<String, Value>, raws: I) -> Result<(), CoercionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut values = Vec::new();
        for raw in raws.into_iter().filter(|r| !r.is_empty()) {
            values.push(coerce(&self.leaf.kind, raw)?);
        }

        if values.is_empty() {
            return Ok(());
        }

        if self.leaf.repeated {
            let mut merged = match self.take(root) {
                Some(Value::Array(existing)) => existing,
                _ => Vec::new(),
            };
            merged.extend(values);
            self.assign(root, Value::Array(merged));
        } else if let Some(last) = values.pop() {
            self.assign(root, last);
        }
        Ok(())
    }

    fn take(&self, root: &mut Map<String, Value>) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut target = root;
        for segment in parents {
            target = target.get_mut(*segment)?.as_object_mut()?;
        }
        target.remove(*last)
    }
}

/// Coerce a raw string to the JSON representation of `kind`.
pub fn coerce(kind: &FieldKind, raw: &str) -> Result<Value, CoercionError> {
    match kind {
        FieldKind::String => Ok(Value::String(raw.to_string())),
        FieldKind::Int64 => raw
            .parse::<i64>()
            .map(|n| Value::Number(Number::from(n)))
            .map_err(|_| CoercionError::new(raw)),
        FieldKind::Int32 => raw
            .parse::<i32>()
            .map(|n| Value::Number(Number::from(n)))
            .map_err(|_| CoercionError::new(raw)),
        FieldKind::Bool => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(CoercionError::new(raw)),
        },
        FieldKind::Enum(descriptor) if descriptor.contains(raw) => {
            Ok(Value::String(raw.to_string()))
        }
        FieldKind::Enum(_) | FieldKind::Message(_) => Err(CoercionError::new(raw)),
    }
}
