//! Integration tests for the transport layer
//!
//! These tests verify how the codec classifies bodies and what it writes
//! on the wire.

#[cfg(test)]
mod tests {
    use crate::protocol::error::DecodeError;
    use crate::protocol::{Envelope, EnvelopeKind, ErrorObject, Id, Payload, Request, Response};
    use crate::transport::JsonCodec;
    use serde_json::{json, Value};

    fn to_value(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    // ============================================================================
    // Encoding
    // ============================================================================

    #[test]
    fn test_encode_request_stamps_version() {
        let request = Request::new(7u64, "echo", Some(Payload::encode("hi").unwrap()));
        let encoded = JsonCodec::encode(request).unwrap();
        assert_eq!(
            to_value(&encoded),
            json!({"jsonrpc": "2.0", "id": 7, "method": "echo", "params": "hi"})
        );
    }

    #[test]
    fn test_encode_notification_omits_id_and_params() {
        let encoded = JsonCodec::encode(Request::notification("ping", None)).unwrap();
        assert_eq!(to_value(&encoded), json!({"jsonrpc": "2.0", "method": "ping"}));
    }

    #[test]
    fn test_encode_success_response() {
        let response = Response::success(Id::from("a"), Payload::encode(&json!({"x": 1})).unwrap());
        let encoded = JsonCodec::encode(response).unwrap();
        assert_eq!(
            to_value(&encoded),
            json!({"jsonrpc": "2.0", "id": "a", "result": {"x": 1}})
        );
    }

    #[test]
    fn test_encode_error_response_with_null_id() {
        let response = Response::failure(Id::Null, ErrorObject::parse_error());
        let encoded = JsonCodec::encode(response).unwrap();
        assert_eq!(
            String::from_utf8(encoded).unwrap(),
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#
        );
    }

    #[test]
    fn test_encode_never_emits_result_and_error_together() {
        let encoded = JsonCodec::encode(Response::failure(Id::from(1u64), ErrorObject::internal_error())).unwrap();
        let value = to_value(&encoded);
        assert!(value.get("result").is_none());
        assert!(value.get("error").is_some());
    }

    #[test]
    fn test_encode_envelope_keeps_version_as_given() {
        let envelope = Envelope {
            method: Some("m".into()),
            ..Envelope::default()
        };
        let encoded = JsonCodec::encode_envelope(&envelope).unwrap();
        assert_eq!(to_value(&encoded), json!({"method": "m"}));
    }

    // ============================================================================
    // Decoding
    // ============================================================================

    #[test]
    fn test_decode_request() {
        let envelope = JsonCodec::decode(br#"{"jsonrpc":"2.0","id":1,"method":"add","params":[1,2]}"#).unwrap();
        assert_eq!(envelope.kind(), EnvelopeKind::Request);
        assert_eq!(envelope.version.as_deref(), Some("2.0"));
        assert_eq!(envelope.params.unwrap().decode::<Vec<i32>>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_decode_keeps_payload_text() {
        let envelope = JsonCodec::decode(br#"{"id":1,"result":{"b":2,"a":1}}"#).unwrap();
        assert_eq!(envelope.result.unwrap().as_str(), r#"{"b":2,"a":1}"#);
    }

    #[test]
    fn test_decode_syntax_error_is_parse_error() {
        let bodies: [&[u8]; 5] = [b"not json", b"invalid_json", b"{\"method\":", b"", &[0xFF, 0xFF]];
        for body in bodies {
            match JsonCodec::decode(body) {
                Err(DecodeError::Parse(_)) => {}
                other => panic!("expected parse error for {:?}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_decode_non_object_is_invalid() {
        let bodies: [&[u8]; 5] = [b"[1,2]", b"5", b"\"str\"", b"null", b"[\"2.0\", 1, \"m\"]"];
        for body in bodies {
            match JsonCodec::decode(body) {
                Err(DecodeError::Invalid { id: None, .. }) => {}
                other => panic!("expected invalid envelope for {:?}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_decode_wrong_member_type_salvages_id() {
        match JsonCodec::decode(br#"{"jsonrpc":"2.0","id":9,"method":5}"#) {
            Err(DecodeError::Invalid { id, .. }) => assert_eq!(id, Some(Id::from(9u64))),
            other => panic!("expected invalid envelope, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_bad_id_type_is_surfaced_not_rejected() {
        let envelope = JsonCodec::decode(br#"{"jsonrpc":"2.0","id":[1],"method":"m"}"#).unwrap();
        assert_eq!(envelope.id, Some(json!([1])));
    }

    #[test]
    fn test_decode_ignores_unknown_members() {
        let envelope = JsonCodec::decode(br#"{"jsonrpc":"2.0","id":1,"method":"m","extra":true}"#).unwrap();
        assert_eq!(envelope.method.as_deref(), Some("m"));
    }

    #[test]
    fn test_encoded_request_decodes_back() {
        let request = Request::new("req-1", "sum", Some(Payload::encode(&[3, 4]).unwrap()));
        let envelope = JsonCodec::decode(&JsonCodec::encode(request).unwrap()).unwrap();
        assert_eq!(envelope.id, Some(json!("req-1")));
        assert_eq!(envelope.method.as_deref(), Some("sum"));
    }
}
