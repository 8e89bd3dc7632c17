//! Integration tests for the protocol module
//!
//! These tests verify how typed requests and responses are built from and
//! turned into envelopes.

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn envelope(json: &str) -> Envelope {
        serde_json::from_str(json).unwrap()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sum {
        total: i64,
    }

    // ============================================================================
    // Request Tests
    // ============================================================================

    #[test]
    fn test_request_creation() {
        let req = Request::new(1u64, "add", Some(Payload::encode(&[1, 2]).unwrap()));
        assert_eq!(req.id(), Some(&Id::from(1u64)));
        assert_eq!(req.method(), "add");
        assert_eq!(req.params().unwrap().as_str(), "[1,2]");
        assert!(!req.is_notification());
    }

    #[test]
    fn test_notification_has_no_id() {
        let req = Request::notification("log", None);
        assert!(req.is_notification());
        assert!(req.id().is_none());
        assert!(req.params().is_none());
    }

    #[test]
    fn test_null_id_request_is_not_a_notification() {
        let req = Request::new(Id::Null, "m", None);
        assert!(!req.is_notification());
        assert_eq!(req.into_envelope().id, Some(serde_json::Value::Null));
    }

    // ============================================================================
    // Response Tests
    // ============================================================================

    #[test]
    fn test_response_success() {
        let resp = Response::success(Id::from(5u64), Payload::encode(&json!({"total": 3})).unwrap());
        assert!(resp.is_success());
        assert!(resp.error().is_none());
        assert_eq!(resp.decode_result::<Sum>().unwrap(), Sum { total: 3 });
    }

    #[test]
    fn test_response_failure_keeps_error_intact() {
        let error = ErrorObject::application(7, "teapot").unwrap().with_data(json!(["x"]));
        let resp = Response::failure(Id::from("k"), error.clone());
        assert!(!resp.is_success());
        assert_eq!(resp.error(), Some(&error));
        assert!(matches!(resp.decode_result::<Sum>(), Err(JrpcError::MissingResult)));
        assert_eq!(resp.into_result(), Err(error));
    }

    #[test]
    fn test_decode_result_type_mismatch() {
        let resp = Response::success(Id::from(1u64), Payload::encode("text").unwrap());
        assert!(matches!(resp.decode_result::<Sum>(), Err(JrpcError::JsonSerialization(_))));
    }

    #[test]
    fn test_response_from_success_envelope() {
        let resp = Response::from_envelope(envelope(r#"{"jsonrpc":"2.0","id":1,"result":{"total":9}}"#)).unwrap();
        assert_eq!(resp.id(), &Id::from(1u64));
        assert_eq!(resp.decode_result::<Sum>().unwrap(), Sum { total: 9 });
    }

    #[test]
    fn test_response_from_null_result_is_success() {
        let resp = Response::from_envelope(envelope(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.decode_result::<Option<i32>>().unwrap(), None);
    }

    #[test]
    fn test_response_from_error_envelope() {
        let resp = Response::from_envelope(envelope(
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#,
        ))
        .unwrap();
        assert_eq!(resp.id(), &Id::Null);
        assert_eq!(resp.error().unwrap().code(), jsonrpc::PARSE_ERROR);
    }

    #[test]
    fn test_response_from_envelope_tolerates_null_result_beside_error() {
        let resp = Response::from_envelope(envelope(
            r#"{"id":2,"result":null,"error":{"code":-32601,"message":"Method not found"}}"#,
        ))
        .unwrap();
        assert_eq!(resp.error().unwrap().code(), jsonrpc::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_response_from_envelope_rejects_ambiguous_replies() {
        let both = envelope(r#"{"id":1,"result":1,"error":{"code":1,"message":"x"}}"#);
        assert!(matches!(Response::from_envelope(both), Err(JrpcError::InvalidResponse(_))));

        let neither = envelope(r#"{"jsonrpc":"2.0","id":1}"#);
        assert!(matches!(Response::from_envelope(neither), Err(JrpcError::InvalidResponse(_))));

        let request = envelope(r#"{"id":1,"method":"m"}"#);
        assert!(matches!(Response::from_envelope(request), Err(JrpcError::InvalidResponse(_))));

        let bad_id = envelope(r#"{"id":true,"result":1}"#);
        assert!(matches!(Response::from_envelope(bad_id), Err(JrpcError::InvalidResponse(_))));
    }

    #[test]
    fn test_response_envelope_has_exactly_one_outcome() {
        let ok = Response::success(Id::from(1u64), Payload::encode(&1).unwrap()).into_envelope();
        assert!(ok.result.is_some() && ok.error.is_none());

        let failed = Response::failure(Id::from(1u64), ErrorObject::invalid_params()).into_envelope();
        assert!(failed.result.is_none() && failed.error.is_some());
    }
}
