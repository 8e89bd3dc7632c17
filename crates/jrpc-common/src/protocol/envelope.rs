//! Wire-level JSON-RPC object.
//!
//! [`Envelope`] mirrors the JSON object exactly, with every member optional,
//! so that one type can be used to read both requests and responses. It
//! never reaches handlers; the dispatcher and the client turn it into a
//! [`Request`](super::Request) or [`Response`](super::Response).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use super::jsonrpc::ErrorObject;
use super::payload::Payload;

/// Protocol version tag stamped on every outgoing message.
pub const VERSION: &str = "2.0";

/// Correlation id: a string, a number, or `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Id {
    Null,
    Number(Number),
    String(String),
}

impl Id {
    /// Accepts only the JSON types JSON-RPC allows for an id.
    pub fn from_value(value: &Value) -> Option<Id> {
        match value {
            Value::Null => Some(Id::Null),
            Value::Number(n) => Some(Id::Number(n.clone())),
            Value::String(s) => Some(Id::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Id::Null => Value::Null,
            Id::Number(n) => Value::Number(n.clone()),
            Id::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n.into())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n.into())
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_owned())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Null => f.write_str("null"),
            Id::Number(n) => write!(f, "{}", n),
            Id::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Id::Null => serializer.serialize_unit(),
            Id::Number(n) => n.serialize(serializer),
            Id::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Id::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("id must be a string, number or null, got {}", value))
        })
    }
}

/// What kind of message an envelope looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    Request,
    Response,
    Malformed,
}

/// The raw JSON-RPC object.
///
/// `id`, `params` and `result` distinguish "absent" from "present and null":
/// an absent member is `None`, an explicit `null` is `Some`. `id` is kept as
/// a raw value; checking its type is the dispatcher's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "jsonrpc", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub params: Option<Payload>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub result: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

/// Maps a present member (including `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Envelope {
    pub fn kind(&self) -> EnvelopeKind {
        if self.method.is_some() {
            EnvelopeKind::Request
        } else if self.id.is_some() || self.result.is_some() || self.error.is_some() {
            EnvelopeKind::Response
        } else {
            EnvelopeKind::Malformed
        }
    }
}
