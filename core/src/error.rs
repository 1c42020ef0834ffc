//! Error types for the YOURLS API client.
//!
//! # Design
//! Transport failures never appear here directly: the client turns them into
//! a synthetic status-500 response, so they surface as `ApiError::Api` with
//! the transport's message. `Decoding` is kept apart from `Api` because the
//! server did report success; only the body shape was unexpected.

use thiserror::Error;

use crate::action::Action;

/// Errors returned by `YourlsClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client was configured with an API URL that is not HTTP(S).
    #[error("invalid YOURLS API url {url:?}: expected an http:// or https:// url")]
    Configuration { url: String },

    /// The server answered, but the action's success check failed.
    #[error("{action} failed for {input:?} (HTTP {status}): {message}{}", hint_suffix(.action))]
    Api {
        action: Action,
        input: String,
        status: u16,
        message: String,
    },

    /// A successful response lacked a field the typed result needs.
    #[error("could not decode {action} response: {reason}")]
    Decoding { action: Action, reason: String },
}

impl ApiError {
    /// The action whose call produced this error, if any.
    pub fn action(&self) -> Option<Action> {
        match self {
            ApiError::Configuration { .. } => None,
            ApiError::Api { action, .. } | ApiError::Decoding { action, .. } => Some(*action),
        }
    }
}

fn hint_suffix(action: &Action) -> String {
    match action.server_requirement() {
        Some(requirement) => format!(" ({requirement})"),
        None => String::new(),
    }
}

/// A transport could not complete the HTTP round-trip.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);
