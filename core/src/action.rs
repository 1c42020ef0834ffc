//! YOURLS API actions and their success rules.
//!
//! YOURLS does not signal success uniformly. `shorturl` reports it through
//! `status`, the core read actions mirror the HTTP code in `statusCode`, and
//! plugin actions use whatever their plugin returns. Each action therefore
//! owns its success predicate.

use std::fmt;

use serde_json::Value;

use crate::response::ApiResponse;

/// The `action` discriminator sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ShortUrl,
    Expand,
    UrlStats,
    Stats,
    DbStats,
    Delete,
    LookupUrlSubstr,
    Update,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::ShortUrl,
        Action::Expand,
        Action::UrlStats,
        Action::Stats,
        Action::DbStats,
        Action::Delete,
        Action::LookupUrlSubstr,
        Action::Update,
    ];

    /// The wire value of the `action` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::ShortUrl => "shorturl",
            Action::Expand => "expand",
            Action::UrlStats => "url-stats",
            Action::Stats => "stats",
            Action::DbStats => "db-stats",
            Action::Delete => "delete",
            Action::LookupUrlSubstr => "lookup-url-substr",
            Action::Update => "update",
        }
    }

    /// Server-side support an action needs beyond a stock YOURLS install.
    pub fn server_requirement(self) -> Option<&'static str> {
        match self {
            Action::Delete => Some("requires the YOURLS API delete plugin on the server"),
            Action::Update => Some("requires the YOURLS API edit/update plugin on the server"),
            Action::LookupUrlSubstr => {
                Some("requires the lookup-url-substr API plugin on the server")
            }
            _ => None,
        }
    }

    /// Whether `response` counts as a success for this action.
    ///
    /// Every action needs a 2xx status. `shorturl` additionally requires
    /// `status == "success"`. The others reject a `status` other than
    /// `"success"` or a `statusCode` other than 200 when those fields are
    /// present.
    pub fn is_success(self, response: &ApiResponse) -> bool {
        if !response.is_valid() {
            return false;
        }
        match self {
            Action::ShortUrl => response.get("status").and_then(Value::as_str) == Some("success"),
            _ => status_field_ok(response) && status_code_field_ok(response),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn status_field_ok(response: &ApiResponse) -> bool {
    match response.get("status") {
        None | Some(Value::Null) => true,
        Some(value) => value.as_str() == Some("success"),
    }
}

fn status_code_field_ok(response: &ApiResponse) -> bool {
    match response.get("statusCode") {
        None | Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_u64() == Some(200),
        Some(Value::String(s)) => s.trim() == "200",
        Some(_) => false,
    }
}
