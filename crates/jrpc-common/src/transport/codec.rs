use serde::de::{Error as _, IgnoredAny};
use serde_json::error::Category;
use serde_json::Value;

use crate::protocol::envelope::{Envelope, Id, VERSION};
use crate::protocol::error::{DecodeError, Result};
use crate::protocol::Message;

/// JSON codec for JSON-RPC envelopes
///
/// Both directions work on whole messages: the transport hands over one
/// complete body and gets one complete body back.
///
/// # Example
///
/// ```
/// use jrpc_common::transport::JsonCodec;
/// use jrpc_common::protocol::{Request, Payload, EnvelopeKind};
///
/// let request = Request::new(1u64, "add", Some(Payload::encode(&[1, 2]).unwrap()));
/// let encoded = JsonCodec::encode(request).unwrap();
/// assert_eq!(encoded, br#"{"jsonrpc":"2.0","id":1,"method":"add","params":[1,2]}"#);
///
/// let decoded = JsonCodec::decode(&encoded).unwrap();
/// assert_eq!(decoded.kind(), EnvelopeKind::Request);
/// ```
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a message to bytes
    ///
    /// The version tag is always stamped; absent members are omitted.
    ///
    /// # Arguments
    ///
    /// * `message` - A [`Request`](crate::protocol::Request),
    ///   [`Response`](crate::protocol::Response) or raw envelope
    ///
    /// # Returns
    ///
    /// JSON-encoded message as a byte vector
    pub fn encode<M: Message>(message: M) -> Result<Vec<u8>> {
        let mut envelope = message.into_envelope();
        envelope.version = Some(VERSION.to_owned());
        Self::encode_envelope(&envelope)
    }

    /// Encode an envelope exactly as given, without stamping the version.
    pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(envelope)?)
    }

    /// Decode an envelope from bytes
    ///
    /// # Arguments
    ///
    /// * `data` - One complete JSON text
    ///
    /// # Returns
    ///
    /// The decoded envelope, [`DecodeError::Parse`] when `data` is not JSON,
    /// or [`DecodeError::Invalid`] when it is JSON but not an envelope.
    pub fn decode(data: &[u8]) -> std::result::Result<Envelope, DecodeError> {
        // serde accepts a sequence for a struct, so arrays are turned away
        // before the derive gets to see them.
        if data.iter().find(|b| !b.is_ascii_whitespace()) != Some(&b'{') {
            return match serde_json::from_slice::<IgnoredAny>(data) {
                Err(e) => {
                    tracing::trace!("Parse error in {} bytes: {}", data.len(), e);
                    Err(DecodeError::Parse(e))
                }
                Ok(_) => {
                    tracing::trace!("Top-level JSON value is not an object");
                    Err(DecodeError::Invalid {
                        id: None,
                        source: serde_json::Error::custom("expected a JSON object"),
                    })
                }
            };
        }

        match serde_json::from_slice::<Envelope>(data) {
            Ok(envelope) => Ok(envelope),
            Err(e) if e.classify() == Category::Data => {
                let id = salvage_id(data);
                tracing::trace!("Envelope does not fit the schema (id {:?}): {}", id, e);
                Err(DecodeError::Invalid { id, source: e })
            }
            Err(e) => {
                tracing::trace!("Parse error in {} bytes: {}", data.len(), e);
                Err(DecodeError::Parse(e))
            }
        }
    }
}

fn salvage_id(data: &[u8]) -> Option<Id> {
    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(members)) => members.get("id").and_then(Id::from_value),
        _ => None,
    }
}
