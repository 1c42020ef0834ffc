//! Synchronous client for the YOURLS URL-shortener API.
//!
//! # Overview
//! YOURLS exposes one endpoint multiplexed by an `action` form field. This
//! crate builds the form-encoded POST for each action, interprets the
//! action's ad-hoc JSON answer and returns typed results.
//!
//! # Design
//! - `YourlsClient` holds only configuration; each call is one request.
//! - Every action is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `ApiResponse`), so the I/O boundary is explicit.
//!   The high-level methods run the round-trip through a `Transport`,
//!   `UreqTransport` by default.
//! - Transport failures become a synthetic status-500 `ApiResponse`; callers
//!   only ever see `ApiError`.
//! - Success is judged per action (`Action::is_success`) because YOURLS
//!   signals it through different fields per action.

pub mod action;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use action::Action;
pub use client::YourlsClient;
pub use config::ClientConfig;
pub use error::{ApiError, TransportError};
pub use http::{HttpRequest, HttpResponse};
pub use response::ApiResponse;
pub use transport::{Transport, UreqTransport};
pub use types::{GlobalStats, LookupResult, ShortUrl, StatsQuery, UrlStats};
