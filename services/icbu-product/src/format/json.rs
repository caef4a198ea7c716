use serde::Serialize;
use serde_json::{json, Map, Value};
use toprest_core::{Error, ParameterSet, Result};

use super::{Outcome, Payload, ResponseCodec, ResponseFormat};
use crate::constants::*;

/// Codec for `format=json` replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ResponseCodec for JsonCodec {
    fn format(&self) -> ResponseFormat {
        ResponseFormat::Json
    }

    fn classify(&self, body: &str) -> Result<Outcome> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            Error::parse(format!(
                "malformed json response at line {} column {}: {e}",
                e.line(),
                e.column()
            ))
            .with_source(e)
        })?;

        let message = value.get(ERROR_RESPONSE).map(error_message);
        let payload = Payload::Json(value);
        Ok(match message {
            Some(message) => Outcome::ApiError { message, payload },
            None => Outcome::Success { payload },
        })
    }

    fn render_request(&self, params: &ParameterSet) -> Result<String> {
        to_pretty_string(&json!({ "request_params": params_to_value(params) }))
    }

    fn render_response(&self, payload: &Payload) -> Result<String> {
        to_pretty_string(&json!({ "response": payload_to_value(payload) }))
    }

    fn render_combined(&self, params: &ParameterSet, payload: &Payload) -> Result<String> {
        to_pretty_string(&json!({
            "request_params": params_to_value(params),
            "response": payload_to_value(payload),
        }))
    }

    fn render_failure(&self, params: &ParameterSet, description: &str) -> Result<String> {
        to_pretty_string(&json!({
            "request_params": params_to_value(params),
            "error_message": description,
        }))
    }
}

/// Pull a readable message out of an `error_response` envelope.
///
/// A bare string envelope is the message. Otherwise prefers `msg`, then
/// `sub_msg`, then the envelope itself.
fn error_message(envelope: &Value) -> String {
    if let Value::String(s) = envelope {
        return s.clone();
    }
    [ERROR_MSG, ERROR_SUB_MSG]
        .iter()
        .find_map(|key| match envelope.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(Value::String(_)) => None,
            Some(v) => Some(v.to_string()),
        })
        .unwrap_or_else(|| envelope.to_string())
}

fn params_to_value(params: &ParameterSet) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect::<Map<String, Value>>(),
    )
}

fn payload_to_value(payload: &Payload) -> Value {
    match payload {
        Payload::Json(v) => v.clone(),
        Payload::Xml(s) => Value::String(s.clone()),
    }
}

/// Serialize with four space indentation.
pub(super) fn to_pretty_string(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| Error::unexpected("failed to serialize json").with_source(e))?;
    String::from_utf8(buf).map_err(|e| Error::unexpected("json output is not utf-8").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use toprest_core::ErrorKind;

    #[test]
    fn test_classify_error_envelope() -> anyhow::Result<()> {
        let body = r#"{"error_response":{"code":27,"msg":"Invalid session","sub_code":"invalid-sessionkey","request_id":"zt0ra8hm8lgu"}}"#;
        let outcome = JsonCodec.classify(body)?;

        match outcome {
            Outcome::ApiError { message, payload } => {
                assert_eq!("Invalid session", message);
                assert_eq!(ResponseFormat::Json, payload.format());
            }
            other => panic!("expected api error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_classify_error_envelope_falls_back_to_sub_msg() -> anyhow::Result<()> {
        let body = r#"{"error_response":{"code":15,"msg":"","sub_msg":"product not found"}}"#;
        let outcome = JsonCodec.classify(body)?;

        assert!(matches!(outcome, Outcome::ApiError { ref message, .. } if message == "product not found"));
        Ok(())
    }

    #[test]
    fn test_classify_string_envelope() -> anyhow::Result<()> {
        let outcome = JsonCodec.classify(r#"{"error_response":"boom"}"#)?;

        match outcome {
            Outcome::ApiError { message, .. } => assert_eq!("boom", message),
            other => panic!("expected api error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_classify_success() -> anyhow::Result<()> {
        let body = r#"{"alibaba_icbu_product_get_response":{"product":{"id":1600123456789,"subject":"Steel pipe"}}}"#;
        let outcome = JsonCodec.classify(body)?;

        assert!(outcome.is_success());
        assert_eq!(
            &Payload::Json(serde_json::from_str(body)?),
            outcome.payload()
        );
        Ok(())
    }

    #[test]
    fn test_classify_nested_error_response_is_success() -> anyhow::Result<()> {
        let body = r#"{"result":{"error_response":{"msg":"not top level"}}}"#;
        assert!(JsonCodec.classify(body)?.is_success());
        Ok(())
    }

    #[test]
    fn test_classify_malformed() {
        let err = JsonCodec.classify("<html>502 Bad Gateway</html>").unwrap_err();
        assert_eq!(ErrorKind::Parse, err.kind());
    }

    #[test]
    fn test_render_request() -> anyhow::Result<()> {
        let params: ParameterSet = [("format", "json"), ("v", "2.0")].into_iter().collect();
        let expected = r#"{
    "request_params": {
        "format": "json",
        "v": "2.0"
    }
}"#;
        assert_eq!(expected, JsonCodec.render_request(&params)?);
        Ok(())
    }

    #[test]
    fn test_render_failure() -> anyhow::Result<()> {
        let params: ParameterSet = [("v", "2.0")].into_iter().collect();
        let expected = r#"{
    "request_params": {
        "v": "2.0"
    },
    "error_message": "connection refused"
}"#;
        assert_eq!(
            expected,
            JsonCodec.render_failure(&params, "connection refused")?
        );
        Ok(())
    }

    #[test]
    fn test_render_combined_keeps_response_order() -> anyhow::Result<()> {
        let params: ParameterSet = [("v", "2.0")].into_iter().collect();
        let payload = Payload::Json(serde_json::from_str(r#"{"z":1,"a":2}"#)?);
        let expected = r#"{
    "request_params": {
        "v": "2.0"
    },
    "response": {
        "z": 1,
        "a": 2
    }
}"#;
        assert_eq!(expected, JsonCodec.render_combined(&params, &payload)?);
        Ok(())
    }
}
