//! Request builder, response interpreter and dispatcher for the YOURLS API.
//!
//! # Design
//! Every action is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `ApiResponse`, so
//! callers with their own HTTP stack can use the client without I/O. The
//! high-level methods (`generate_short_url`, `expand_short_url`, ...) chain
//! build, `Transport::execute` and parse. The client carries no mutable
//! state between calls.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::action::Action;
use crate::config::ClientConfig;
use crate::domain::{derive_domain, qualify};
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::response::ApiResponse;
use crate::transport::{Transport, UreqTransport};
use crate::types::{GlobalStats, LookupResult, ShortUrl, StatsQuery, UrlStats};

/// Client for one YOURLS API endpoint.
pub struct YourlsClient<T = UreqTransport> {
    endpoint: String,
    domain: String,
    username: String,
    password: String,
    transport: T,
}

impl YourlsClient<UreqTransport> {
    /// Client with the default 10 second timeout.
    pub fn new(api_url: &str, username: &str, password: &str) -> Result<Self, ApiError> {
        Self::from_config(ClientConfig::new(api_url, username, password))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        // validate before building the agent
        config.endpoint()?;
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> YourlsClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        let endpoint = config.endpoint()?;
        let domain = derive_domain(&endpoint);
        if domain.is_empty() {
            warn!(api_url = %endpoint, "no host in YOURLS api url; keywords will not be qualified");
        }
        Ok(Self {
            endpoint,
            domain,
            username: config.username,
            password: config.password,
            transport,
        })
    }

    /// The API URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `scheme://host[:port]` used to qualify bare keywords. May be empty.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Dispatching operations
    // -----------------------------------------------------------------------

    /// Shorten `long_url`, optionally with a custom keyword and title.
    ///
    /// If YOURLS already holds the URL or keyword and says which keyword, the
    /// existing link is returned as `ShortUrl::AlreadyExists`.
    pub fn generate_short_url(
        &self,
        long_url: &str,
        keyword: Option<&str>,
        title: Option<&str>,
    ) -> Result<ShortUrl, ApiError> {
        let request = self.build_generate_short_url(long_url, keyword, title);
        let response = self.dispatch(Action::ShortUrl, &request);
        self.parse_generate_short_url(long_url, &response)
    }

    pub fn expand_short_url(&self, short_url: &str) -> Result<String, ApiError> {
        let request = self.build_expand_short_url(short_url);
        let response = self.dispatch(Action::Expand, &request);
        self.parse_expand_short_url(short_url, &response)
    }

    pub fn get_short_url_stats(&self, short_url: &str) -> Result<UrlStats, ApiError> {
        let request = self.build_short_url_stats(short_url);
        let response = self.dispatch(Action::UrlStats, &request);
        self.parse_short_url_stats(short_url, &response)
    }

    /// Raw `stats` body; its shape depends on the filter.
    pub fn get_stats(&self, query: &StatsQuery) -> Result<Map<String, Value>, ApiError> {
        let request = self.build_stats(query);
        let response = self.dispatch(Action::Stats, &request);
        self.parse_stats(query, response)
    }

    pub fn get_global_stats(&self) -> Result<GlobalStats, ApiError> {
        let request = self.build_global_stats();
        let response = self.dispatch(Action::DbStats, &request);
        self.parse_global_stats(&response)
    }

    /// Needs the delete plugin on the server.
    pub fn delete_by_short_url(&self, short_url: &str) -> Result<(), ApiError> {
        let request = self.build_delete(short_url);
        let response = self.dispatch(Action::Delete, &request);
        self.parse_delete(short_url, &response)
    }

    /// Needs substring lookup support on the server.
    pub fn find_short_urls_by_long_url(&self, long_url: &str) -> Result<LookupResult, ApiError> {
        let request = self.build_lookup(long_url);
        let response = self.dispatch(Action::LookupUrlSubstr, &request);
        self.parse_lookup(long_url, &response)
    }

    /// Needs the update plugin on the server.
    pub fn update_short_url_target(&self, short_url: &str, target_url: &str) -> Result<(), ApiError> {
        let request = self.build_update(short_url, target_url);
        let response = self.dispatch(Action::Update, &request);
        self.parse_update(short_url, &response)
    }

    fn dispatch(&self, action: Action, request: &HttpRequest) -> ApiResponse {
        debug!(%action, endpoint = %request.url, "sending YOURLS request");
        let response = match self.transport.execute(request) {
            Ok(raw) => ApiResponse::from_http(raw),
            Err(e) => {
                warn!(%action, error = %e, "YOURLS transport failure");
                ApiResponse::transport_failure(e.to_string())
            }
        };
        debug!(%action, status = response.status(), "YOURLS response received");
        response
    }
}

impl<T> YourlsClient<T> {
    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_generate_short_url(
        &self,
        long_url: &str,
        keyword: Option<&str>,
        title: Option<&str>,
    ) -> HttpRequest {
        let mut params = vec![("url", long_url)];
        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            params.push(("keyword", keyword));
        }
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            params.push(("title", title));
        }
        self.request(Action::ShortUrl, &params)
    }

    pub fn build_expand_short_url(&self, short_url: &str) -> HttpRequest {
        self.request(Action::Expand, &[("shorturl", short_url)])
    }

    pub fn build_short_url_stats(&self, short_url: &str) -> HttpRequest {
        self.request(Action::UrlStats, &[("shorturl", short_url)])
    }

    pub fn build_stats(&self, query: &StatsQuery) -> HttpRequest {
        let limit = query.limit.to_string();
        self.request(Action::Stats, &[("filter", query.filter.as_str()), ("limit", limit.as_str())])
    }

    pub fn build_global_stats(&self) -> HttpRequest {
        self.request(Action::DbStats, &[])
    }

    pub fn build_delete(&self, short_url: &str) -> HttpRequest {
        self.request(Action::Delete, &[("shorturl", short_url)])
    }

    pub fn build_lookup(&self, long_url: &str) -> HttpRequest {
        self.request(Action::LookupUrlSubstr, &[("substr", long_url)])
    }

    pub fn build_update(&self, short_url: &str, target_url: &str) -> HttpRequest {
        self.request(Action::Update, &[("shorturl", short_url), ("url", target_url)])
    }

    fn request(&self, action: Action, params: &[(&str, &str)]) -> HttpRequest {
        let mut form = vec![
            ("action".to_string(), action.as_str().to_string()),
            ("format".to_string(), "json".to_string()),
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ];
        form.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        HttpRequest {
            url: self.endpoint.clone(),
            form,
        }
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_generate_short_url(
        &self,
        long_url: &str,
        response: &ApiResponse,
    ) -> Result<ShortUrl, ApiError> {
        let action = Action::ShortUrl;
        if action.is_success(response) {
            return match response.get("shorturl") {
                Some(Value::String(url)) => Ok(ShortUrl::Created(url.clone())),
                _ => Err(ApiError::Decoding {
                    action,
                    reason: "missing field `shorturl`".to_string(),
                }),
            };
        }
        match existing_keyword(response) {
            Some(keyword) => {
                debug!(%keyword, "short url already exists");
                Ok(ShortUrl::AlreadyExists(qualify(&self.domain, &keyword)))
            }
            None => Err(api_failure(action, long_url, response)),
        }
    }

    pub fn parse_expand_short_url(
        &self,
        short_url: &str,
        response: &ApiResponse,
    ) -> Result<String, ApiError> {
        let action = Action::Expand;
        ensure_success(action, short_url, response)?;
        match response.get("longurl") {
            Some(Value::String(url)) => Ok(url.clone()),
            _ => Err(ApiError::Decoding {
                action,
                reason: "missing field `longurl`".to_string(),
            }),
        }
    }

    pub fn parse_short_url_stats(
        &self,
        short_url: &str,
        response: &ApiResponse,
    ) -> Result<UrlStats, ApiError> {
        ensure_success(Action::UrlStats, short_url, response)?;
        UrlStats::from_response(response)
    }

    pub fn parse_stats(
        &self,
        query: &StatsQuery,
        response: ApiResponse,
    ) -> Result<Map<String, Value>, ApiError> {
        ensure_success(Action::Stats, &query.filter, &response)?;
        Ok(response.into_body())
    }

    pub fn parse_global_stats(&self, response: &ApiResponse) -> Result<GlobalStats, ApiError> {
        ensure_success(Action::DbStats, "", response)?;
        GlobalStats::from_response(response)
    }

    pub fn parse_delete(&self, short_url: &str, response: &ApiResponse) -> Result<(), ApiError> {
        ensure_success(Action::Delete, short_url, response)
    }

    pub fn parse_lookup(
        &self,
        long_url: &str,
        response: &ApiResponse,
    ) -> Result<LookupResult, ApiError> {
        ensure_success(Action::LookupUrlSubstr, long_url, response)?;
        LookupResult::from_response(response, &self.domain)
    }

    pub fn parse_update(&self, short_url: &str, response: &ApiResponse) -> Result<(), ApiError> {
        ensure_success(Action::Update, short_url, response)
    }
}

impl<T> fmt::Debug for YourlsClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YourlsClient")
            .field("endpoint", &self.endpoint)
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn ensure_success(action: Action, input: &str, response: &ApiResponse) -> Result<(), ApiError> {
    if action.is_success(response) {
        Ok(())
    } else {
        Err(api_failure(action, input, response))
    }
}

fn api_failure(action: Action, input: &str, response: &ApiResponse) -> ApiError {
    ApiError::Api {
        action,
        input: input.to_string(),
        status: response.status(),
        message: response.message(),
    }
}

/// `url.keyword` from a rejected `shorturl` call.
fn existing_keyword(response: &ApiResponse) -> Option<String> {
    match response.get("url")?.get("keyword")? {
        Value::String(keyword) if !keyword.is_empty() => Some(keyword.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
