//! Executing `HttpRequest`s.
//!
//! # Design
//! `Transport` is the only place the client touches the network. It returns
//! the status and body for any HTTP answer, including 4xx/5xx, and an error
//! only when no answer was obtained. `UreqTransport` is the blocking default.

use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, FORM_CONTENT_TYPE};

/// Executes one form-encoded POST.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// Status codes are returned as data rather than errors so the client can
/// read YOURLS' JSON failure bodies.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = self
            .agent
            .post(&request.url)
            .content_type(FORM_CONTENT_TYPE)
            .send(request.encoded_body().as_bytes())
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
