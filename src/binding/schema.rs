//! Static message schemas.
//!
//! Request messages describe their fields with a static [`MessageSchema`].
//! Field paths are resolved against these tables once, when a route is
//! registered; per-request binding only walks the JSON tree.

use serde::de::DeserializeOwned;

/// Symbolic values of an enum type.
#[derive(Debug, PartialEq)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

impl EnumDescriptor {
    /// Case-sensitive lookup of a symbolic name.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| *v == value)
    }
}

/// Declared kind of a message field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    String,
    Int32,
    Int64,
    Bool,
    Enum(&'static EnumDescriptor),
    Message(&'static MessageSchema),
}

impl FieldKind {
    pub fn is_message(&self) -> bool {
        matches!(self, FieldKind::Message(_))
    }
}

/// A single field of a message.
#[derive(Debug, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub repeated: bool,
}

impl FieldDescriptor {
    pub const fn singular(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            repeated: false,
        }
    }

    pub const fn repeated(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            repeated: true,
        }
    }
}

/// Field table of a message type.
#[derive(Debug, PartialEq)]
pub struct MessageSchema {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl MessageSchema {
    pub fn field(&'static self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A request type the gateway can bind HTTP input into.
///
/// Implementors decode from the JSON tree assembled by the binders, so every
/// field should carry a default (`#[serde(default)]`) for absent input to
/// mean "zero value".
pub trait RequestMessage: DeserializeOwned + Send + 'static {
    fn schema() -> &'static MessageSchema;
}
