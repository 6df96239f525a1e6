//! Echo service messages and their binding schemas.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binding::{EnumDescriptor, FieldDescriptor, FieldKind, MessageSchema, RequestMessage};

pub static ECHO_TYPE: EnumDescriptor = EnumDescriptor {
    name: "EchoType",
    values: &["TYPE_A", "TYPE_B"],
};

pub static ECHO: MessageSchema = MessageSchema {
    name: "Echo",
    fields: &[
        FieldDescriptor::singular("id", FieldKind::Int64),
        FieldDescriptor::singular("content", FieldKind::String),
    ],
};

/// The echo payload carried by every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Echo {
    pub id: i64,
    pub content: String,
}

impl Echo {
    pub fn new(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EchoType {
    #[default]
    TypeA,
    TypeB,
}

impl EchoType {
    pub fn name(self) -> &'static str {
        match self {
            EchoType::TypeA => "TYPE_A",
            EchoType::TypeB => "TYPE_B",
        }
    }
}

impl fmt::Display for EchoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! request_message {
    ($ty:ident, $schema:ident) => {
        impl RequestMessage for $ty {
            fn schema() -> &'static MessageSchema {
                &$schema
            }
        }
    };
}

pub static ID_REQUEST: MessageSchema = MessageSchema {
    name: "IdRequest",
    fields: &[FieldDescriptor::singular("id", FieldKind::Int64)],
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetEchoRequest {
    pub id: i64,
}
request_message!(GetEchoRequest, ID_REQUEST);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SingleGetEchoRequest {
    pub id: i64,
}
request_message!(SingleGetEchoRequest, ID_REQUEST);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteEchoRequest {
    pub id: i64,
}
request_message!(DeleteEchoRequest, ID_REQUEST);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorEchoRequest {
    pub id: i64,
}
request_message!(ErrorEchoRequest, ID_REQUEST);

pub static CONTENT_REQUEST: MessageSchema = MessageSchema {
    name: "GetEchoByContentRequest",
    fields: &[FieldDescriptor::singular("content", FieldKind::String)],
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetEchoByContentRequest {
    pub content: String,
}
request_message!(GetEchoByContentRequest, CONTENT_REQUEST);

pub static ENUM_REQUEST: MessageSchema = MessageSchema {
    name: "EnumGetEchoRequest",
    fields: &[
        FieldDescriptor::singular("type", FieldKind::Enum(&ECHO_TYPE)),
        FieldDescriptor::repeated("types", FieldKind::Enum(&ECHO_TYPE)),
    ],
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnumGetEchoRequest {
    #[serde(rename = "type")]
    pub kind: EchoType,
    pub types: Vec<EchoType>,
}
request_message!(EnumGetEchoRequest, ENUM_REQUEST);

pub static MULTI_REQUEST: MessageSchema = MessageSchema {
    name: "MultiGetEchoRequest",
    fields: &[FieldDescriptor::repeated("id", FieldKind::Int64)],
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MultiGetEchoRequest {
    pub id: Vec<i64>,
}
request_message!(MultiGetEchoRequest, MULTI_REQUEST);

pub static ECHO_REQUEST: MessageSchema = MessageSchema {
    name: "EchoRequest",
    fields: &[FieldDescriptor::singular("echo", FieldKind::Message(&ECHO))],
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewEchoRequest {
    pub echo: Echo,
}
request_message!(NewEchoRequest, ECHO_REQUEST);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEchoRequest {
    pub echo: Echo,
}
request_message!(UpdateEchoRequest, ECHO_REQUEST);
