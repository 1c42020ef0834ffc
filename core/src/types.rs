//! Typed results built from validated YOURLS responses.
//!
//! # Design
//! Each builder takes an `ApiResponse` that already passed its action's
//! success check and projects the fields it needs, coercing numeric strings
//! and timestamps on the way. A missing or malformed field is an
//! `ApiError::Decoding`; nothing falls back to a default.

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::domain::qualify;
use crate::error::ApiError;
use crate::response::ApiResponse;

/// YOURLS stores link timestamps as MySQL `DATETIME` strings.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of `shorturl`.
///
/// YOURLS rejects a long URL or keyword it already knows; when the rejection
/// names the existing keyword the call resolves to that link instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortUrl {
    Created(String),
    AlreadyExists(String),
}

impl ShortUrl {
    pub fn as_str(&self) -> &str {
        match self {
            ShortUrl::Created(url) | ShortUrl::AlreadyExists(url) => url,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ShortUrl::Created(url) | ShortUrl::AlreadyExists(url) => url,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ShortUrl::Created(_))
    }
}

/// Click statistics for one short link (`url-stats`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlStats {
    pub clicks: u64,
    pub timestamp: NaiveDateTime,
    pub ip: String,
    pub long_url: String,
    pub short_url: String,
}

impl UrlStats {
    pub fn from_response(response: &ApiResponse) -> Result<Self, ApiError> {
        let action = Action::UrlStats;
        let link = object_field(response.body(), "link", action)?;
        Ok(Self {
            clicks: u64_field(link, "clicks", action)?,
            timestamp: timestamp_field(link, "timestamp", action)?,
            ip: string_field(link, "ip", action)?,
            long_url: string_field(link, "url", action)?,
            short_url: string_field(link, "shorturl", action)?,
        })
    }
}

/// Totals for the whole installation (`db-stats`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStats {
    pub total_links: u64,
    pub total_clicks: u64,
}

impl GlobalStats {
    pub fn from_response(response: &ApiResponse) -> Result<Self, ApiError> {
        let action = Action::DbStats;
        let stats = object_field(response.body(), "db-stats", action)?;
        Ok(Self {
            total_links: u64_field(stats, "total_links", action)?,
            total_clicks: u64_field(stats, "total_clicks", action)?,
        })
    }
}

/// Short URLs whose target contains a queried substring
/// (`lookup-url-substr`), in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResult {
    short_urls: Vec<String>,
}

impl LookupResult {
    pub fn from_response(response: &ApiResponse, domain: &str) -> Result<Self, ApiError> {
        let action = Action::LookupUrlSubstr;
        let keywords = match response.get("keywords") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(malformed(action, "keywords", "an array")),
            None => return Err(missing(action, "keywords")),
        };
        let short_urls = keywords
            .iter()
            .map(|item| match item {
                Value::String(keyword) => Ok(qualify(domain, keyword)),
                Value::Number(n) => Ok(qualify(domain, &n.to_string())),
                _ => Err(malformed(action, "keywords[]", "a string")),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { short_urls })
    }

    pub fn short_urls(&self) -> &[String] {
        &self.short_urls
    }

    pub fn into_short_urls(self) -> Vec<String> {
        self.short_urls
    }

    pub fn is_empty(&self) -> bool {
        self.short_urls.is_empty()
    }
}

/// Parameters of the `stats` action. `filter` is one of `top`, `bottom`,
/// `rand` or `last`, but is passed through unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub filter: String,
    pub limit: u32,
}

impl StatsQuery {
    pub fn new(filter: impl Into<String>, limit: u32) -> Self {
        Self {
            filter: filter.into(),
            limit,
        }
    }
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self::new("top", 10)
    }
}

fn missing(action: Action, field: &str) -> ApiError {
    ApiError::Decoding {
        action,
        reason: format!("missing field `{field}`"),
    }
}

fn malformed(action: Action, field: &str, expected: &str) -> ApiError {
    ApiError::Decoding {
        action,
        reason: format!("field `{field}` is not {expected}"),
    }
}

fn object_field<'a>(
    body: &'a Map<String, Value>,
    key: &str,
    action: Action,
) -> Result<&'a Map<String, Value>, ApiError> {
    match body.get(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(malformed(action, key, "an object")),
        None => Err(missing(action, key)),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str, action: Action) -> Result<String, ApiError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(malformed(action, key, "a string")),
        None => Err(missing(action, key)),
    }
}

/// Counters arrive as JSON numbers or as numeric strings depending on the
/// action and the database driver.
fn u64_field(obj: &Map<String, Value>, key: &str, action: Action) -> Result<u64, ApiError> {
    let parsed = match obj.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
        None => return Err(missing(action, key)),
    };
    parsed.ok_or_else(|| malformed(action, key, "a non-negative integer"))
}

fn timestamp_field(
    obj: &Map<String, Value>,
    key: &str,
    action: Action,
) -> Result<NaiveDateTime, ApiError> {
    let raw = string_field(obj, key, action)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.naive_utc()))
        .map_err(|_| malformed(action, key, "a timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn response(body: Value) -> ApiResponse {
        match body {
            Value::Object(map) => ApiResponse::new(200, map),
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn url_stats_projects_link_fields() {
        let resp = response(json!({
            "statusCode": 200,
            "message": "success",
            "link": {
                "clicks": 2,
                "timestamp": "1970-01-01 00:00:00",
                "ip": "1.1.1.1",
                "url": "http://example.com",
                "shorturl": "1"
            }
        }));
        let stats = UrlStats::from_response(&resp).unwrap();
        assert_eq!(stats.clicks, 2);
        assert_eq!(
            stats.timestamp,
            NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(stats.ip, "1.1.1.1");
        assert_eq!(stats.long_url, "http://example.com");
        assert_eq!(stats.short_url, "1");
    }

    #[test]
    fn url_stats_coerces_string_clicks() {
        let resp = response(json!({
            "link": {
                "clicks": "17",
                "timestamp": "2024-03-05 14:30:59",
                "ip": "::1",
                "url": "http://example.com",
                "shorturl": "http://sho.rt/a"
            }
        }));
        let stats = UrlStats::from_response(&resp).unwrap();
        assert_eq!(stats.clicks, 17);
        assert_eq!(stats.timestamp.to_string(), "2024-03-05 14:30:59");
    }

    #[test]
    fn url_stats_missing_link_is_decoding_error() {
        let err = UrlStats::from_response(&response(json!({"statusCode": 200}))).unwrap_err();
        assert!(matches!(err, ApiError::Decoding { action: Action::UrlStats, .. }));
        assert!(err.to_string().contains("`link`"));
    }

    #[test]
    fn url_stats_bad_timestamp_is_decoding_error() {
        let resp = response(json!({
            "link": {
                "clicks": 0,
                "timestamp": "yesterday",
                "ip": "1.1.1.1",
                "url": "http://example.com",
                "shorturl": "1"
            }
        }));
        let err = UrlStats::from_response(&resp).unwrap_err();
        assert!(err.to_string().contains("`timestamp`"), "{err}");
    }

    #[test]
    fn global_stats_coerces_strings() {
        let resp = response(json!({
            "db-stats": {"total_links": "5", "total_clicks": "42"},
            "statusCode": 200
        }));
        let stats = GlobalStats::from_response(&resp).unwrap();
        assert_eq!(
            stats,
            GlobalStats {
                total_links: 5,
                total_clicks: 42
            }
        );
    }

    #[test]
    fn global_stats_rejects_negative_counts() {
        let resp = response(json!({"db-stats": {"total_links": -1, "total_clicks": 0}}));
        assert!(matches!(
            GlobalStats::from_response(&resp),
            Err(ApiError::Decoding { .. })
        ));
    }

    #[test]
    fn global_stats_missing_total_is_decoding_error() {
        let resp = response(json!({"db-stats": {"total_links": "5"}}));
        let err = GlobalStats::from_response(&resp).unwrap_err();
        assert!(err.to_string().contains("`total_clicks`"));
    }

    #[test]
    fn lookup_qualifies_keywords_in_order() {
        let resp = response(json!({"status": "success", "keywords": ["b", "a", 7]}));
        let result = LookupResult::from_response(&resp, "http://sho.rt").unwrap();
        assert_eq!(
            result.short_urls(),
            ["http://sho.rt/b", "http://sho.rt/a", "http://sho.rt/7"]
        );
    }

    #[test]
    fn lookup_with_empty_domain_yields_bare_paths() {
        let resp = response(json!({"keywords": ["k"]}));
        let result = LookupResult::from_response(&resp, "").unwrap();
        assert_eq!(result.into_short_urls(), vec!["/k".to_string()]);
    }

    #[test]
    fn lookup_without_keywords_is_decoding_error() {
        let err = LookupResult::from_response(&response(json!({})), "http://sho.rt").unwrap_err();
        assert!(matches!(
            err,
            ApiError::Decoding {
                action: Action::LookupUrlSubstr,
                ..
            }
        ));
    }

    #[test]
    fn short_url_accessors() {
        let created = ShortUrl::Created("http://sho.rt/1".to_string());
        let existing = ShortUrl::AlreadyExists("http://sho.rt/2".to_string());
        assert!(created.is_new());
        assert!(!existing.is_new());
        assert_eq!(existing.as_str(), "http://sho.rt/2");
        assert_eq!(created.into_string(), "http://sho.rt/1");
    }

    #[test]
    fn stats_query_defaults_to_top_ten() {
        assert_eq!(StatsQuery::default(), StatsQuery::new("top", 10));
    }
}
