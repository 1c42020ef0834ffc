//! The raw YOURLS response envelope.
//!
//! # Design
//! YOURLS answers every action with a different JSON shape, so the body is
//! kept as an untyped `serde_json::Map` here and only the status-code range
//! is judged. Action-specific success fields are checked by
//! `Action::is_success`, and typed extraction happens in `types`.

use serde_json::{Map, Value};

use crate::http::HttpResponse;

/// Status code substituted when no usable response was received.
pub const SYNTHETIC_FAILURE_STATUS: u16 = 500;

/// A decoded (status code, JSON object) pair. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    body: Map<String, Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Map<String, Value>) -> Self {
        Self { status, body }
    }

    /// Decode a raw HTTP response.
    ///
    /// A body that is not a JSON object is treated like a transport failure:
    /// the result is a synthetic status-500 response whose `message` names
    /// the decoding problem.
    pub fn from_http(response: HttpResponse) -> Self {
        match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(body)) => Self::new(response.status, body),
            Ok(other) => Self::transport_failure(format!(
                "malformed response (HTTP {}): expected a JSON object, got {}",
                response.status,
                json_kind(&other)
            )),
            Err(e) => Self::transport_failure(format!(
                "malformed response (HTTP {}): {e}",
                response.status
            )),
        }
    }

    /// The stand-in for a call that produced no response at all.
    pub fn transport_failure(message: impl Into<String>) -> Self {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(message.into()));
        Self::new(SYNTHETIC_FAILURE_STATUS, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }

    /// Look up a top-level field. Missing keys are `None`, not an error.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The server's `message` field, or an empty string when absent.
    pub fn message(&self) -> String {
        match self.body.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// True when the status code is in `200..300`.
    pub fn is_valid(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<HttpResponse> for ApiResponse {
    fn from(response: HttpResponse) -> Self {
        Self::from_http(response)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn decodes_object_body() {
        let resp = ApiResponse::from_http(http(200, r#"{"status":"success","shorturl":"http://sho.rt/1"}"#));
        assert_eq!(resp.status(), 200);
        assert!(resp.is_valid());
        assert_eq!(resp.get("shorturl").and_then(Value::as_str), Some("http://sho.rt/1"));
        assert!(resp.get("longurl").is_none());
    }

    #[test]
    fn message_defaults_to_empty() {
        let resp = ApiResponse::from_http(http(200, "{}"));
        assert_eq!(resp.message(), "");
    }

    #[test]
    fn validity_is_status_range_only() {
        let fail_body = r#"{"status":"fail","message":"nope"}"#;
        assert!(ApiResponse::from_http(http(200, fail_body)).is_valid());
        assert!(ApiResponse::from_http(http(299, "{}")).is_valid());
        assert!(!ApiResponse::from_http(http(300, "{}")).is_valid());
        assert!(!ApiResponse::from_http(http(199, "{}")).is_valid());
    }

    #[test]
    fn non_json_body_becomes_synthetic_failure() {
        let resp = ApiResponse::from_http(http(200, "<html>oops</html>"));
        assert_eq!(resp.status(), SYNTHETIC_FAILURE_STATUS);
        assert!(!resp.is_valid());
        assert!(resp.message().starts_with("malformed response (HTTP 200)"));
        assert_eq!(resp.body().len(), 1);
    }

    #[test]
    fn non_object_json_becomes_synthetic_failure() {
        let resp = ApiResponse::from_http(http(200, "[1,2]"));
        assert_eq!(resp.status(), SYNTHETIC_FAILURE_STATUS);
        assert!(resp.message().contains("an array"));
    }

    #[test]
    fn transport_failure_carries_only_message() {
        let resp = ApiResponse::transport_failure("connection refused");
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.message(), "connection refused");
        assert_eq!(resp.body().len(), 1);
    }
}
