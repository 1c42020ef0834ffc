//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe a YOURLS API call as plain data. The client builds
//! `HttpRequest` values and interprets `HttpResponse` values; executing the
//! round-trip is the job of a `Transport` (or of the caller, when it drives
//! its own HTTP stack). Every YOURLS call is a form-encoded POST to the same
//! endpoint, so a request is just the endpoint plus ordered form fields.

use url::form_urlencoded;

/// Content type of every request body sent to the YOURLS endpoint.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A form-encoded POST request described as plain data.
///
/// Built by `YourlsClient::build_*` methods. Field order is preserved so the
/// encoded body is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// Look up the first form field named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `application/x-www-form-urlencoded` body for this request.
    pub fn encoded_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form.iter())
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` after executing an `HttpRequest`, then turned
/// into an `ApiResponse` for interpretation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            url: "http://sho.rt/yourls-api.php".to_string(),
            form: vec![
                ("action".to_string(), "shorturl".to_string()),
                ("url".to_string(), "http://example.com/?a=1&b=two words".to_string()),
            ],
        }
    }

    #[test]
    fn param_finds_first_match() {
        let req = request();
        assert_eq!(req.param("action"), Some("shorturl"));
        assert_eq!(req.param("keyword"), None);
    }

    #[test]
    fn encoded_body_escapes_values() {
        assert_eq!(
            request().encoded_body(),
            "action=shorturl&url=http%3A%2F%2Fexample.com%2F%3Fa%3D1%26b%3Dtwo+words"
        );
    }
}
