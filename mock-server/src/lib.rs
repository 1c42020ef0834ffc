//! In-memory stand-in for a YOURLS installation.
//!
//! Serves the `yourls-api.php` endpoint with the core actions plus the
//! delete, update and lookup-url-substr plugin actions, and follows short
//! links at `/{keyword}`. Response shapes mirror what YOURLS sends,
//! including string-typed counters and the `url.keyword` payload on a
//! duplicate `shorturl`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const API_PATH: &str = "/yourls-api.php";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "secret";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug)]
pub struct Link {
    pub keyword: String,
    pub url: String,
    pub title: String,
    pub timestamp: String,
    pub ip: String,
    pub clicks: u64,
}

/// Form fields of an API call. Unknown fields such as `format` are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ApiParams {
    pub action: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub keyword: Option<String>,
    pub title: Option<String>,
    pub shorturl: Option<String>,
    pub filter: Option<String>,
    pub limit: Option<String>,
    pub substr: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    links: Vec<Link>,
    next_id: u64,
}

impl Store {
    fn find(&self, keyword: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.keyword == keyword)
    }

    fn find_mut(&mut self, keyword: &str) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.keyword == keyword)
    }

    fn find_by_url(&self, url: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.url == url)
    }

    fn next_keyword(&mut self) -> String {
        loop {
            self.next_id += 1;
            let candidate = base36(self.next_id);
            if self.find(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn total_clicks(&self) -> u64 {
        self.links.iter().map(|l| l.clicks).sum()
    }
}

#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Store>>,
    username: Arc<str>,
    password: Arc<str>,
}

pub fn app() -> Router {
    app_with_credentials(DEFAULT_USERNAME, DEFAULT_PASSWORD)
}

pub fn app_with_credentials(username: &str, password: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        username: username.into(),
        password: password.into(),
    };
    Router::new()
        .route(API_PATH, post(api))
        .route("/{keyword}", get(follow))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Reply = (StatusCode, Json<Value>);

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

async fn api(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<ApiParams>,
) -> Reply {
    if given(&params.username) != Some(&*state.username)
        || given(&params.password) != Some(&*state.password)
    {
        tracing::debug!("rejecting request with bad credentials");
        return reply(
            StatusCode::FORBIDDEN,
            json!({"errorCode": "403", "message": "Please log in"}),
        );
    }

    let action = given(&params.action).unwrap_or_default();
    tracing::debug!(action, "api request");
    let domain = domain_from_headers(&headers);

    match action {
        "shorturl" => {
            shorturl(
                &state,
                &domain,
                given(&params.url),
                given(&params.keyword),
                given(&params.title),
            )
            .await
        }
        "expand" => expand(&state, &domain, given(&params.shorturl)).await,
        "url-stats" => url_stats(&state, &domain, given(&params.shorturl)).await,
        "stats" => stats(&state, &domain, given(&params.filter), given(&params.limit)).await,
        "db-stats" => db_stats(&state).await,
        "delete" => delete(&state, given(&params.shorturl)).await,
        "update" => update(&state, given(&params.shorturl), given(&params.url)).await,
        "lookup-url-substr" => lookup(&state, given(&params.substr)).await,
        _ => reply(
            StatusCode::BAD_REQUEST,
            json!({"errorCode": "400", "message": "Unknown or missing \"action\" parameter"}),
        ),
    }
}

async fn shorturl(
    state: &AppState,
    domain: &str,
    url: Option<&str>,
    keyword: Option<&str>,
    title: Option<&str>,
) -> Reply {
    let Some(url) = url else {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({
                "status": "fail",
                "code": "error:nourl",
                "message": "Missing or malformed URL",
                "errorCode": "400",
                "statusCode": 400
            }),
        );
    };

    let mut db = state.db.write().await;
    if let Some(existing) = db.find_by_url(url) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({
                "status": "fail",
                "code": "error:url",
                "url": {"keyword": existing.keyword, "url": existing.url, "title": existing.title, "date": existing.timestamp, "ip": existing.ip, "clicks": existing.clicks.to_string()},
                "message": format!("{url} already exists in database"),
                "title": existing.title,
                "shorturl": format!("{domain}/{}", existing.keyword),
                "statusCode": 400
            }),
        );
    }

    let keyword = match keyword {
        Some(k) if db.find(k).is_some() => {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({
                    "status": "fail",
                    "code": "error:keyword",
                    "message": format!("Short URL {k} already exists in database or is reserved"),
                    "statusCode": 400
                }),
            );
        }
        Some(k) => k.to_string(),
        None => db.next_keyword(),
    };

    let link = Link {
        keyword,
        url: url.to_string(),
        title: title.unwrap_or(url).to_string(),
        timestamp: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        ip: "127.0.0.1".to_string(),
        clicks: 0,
    };
    let body = json!({
        "url": {"keyword": link.keyword, "url": link.url, "title": link.title, "date": link.timestamp, "ip": link.ip},
        "status": "success",
        "message": format!("{} added to database", link.url),
        "title": link.title,
        "shorturl": format!("{domain}/{}", link.keyword),
        "statusCode": 200
    });
    tracing::debug!(keyword = %link.keyword, "link created");
    db.links.push(link);
    reply(StatusCode::OK, body)
}

async fn expand(state: &AppState, domain: &str, shorturl: Option<&str>) -> Reply {
    let db = state.db.read().await;
    match shorturl.map(keyword_of).and_then(|k| db.find(k)) {
        Some(link) => reply(
            StatusCode::OK,
            json!({
                "keyword": link.keyword,
                "shorturl": format!("{domain}/{}", link.keyword),
                "longurl": link.url,
                "title": link.title,
                "message": "success",
                "statusCode": 200
            }),
        ),
        None => not_found(),
    }
}

async fn url_stats(state: &AppState, domain: &str, shorturl: Option<&str>) -> Reply {
    let db = state.db.read().await;
    match shorturl.map(keyword_of).and_then(|k| db.find(k)) {
        Some(link) => reply(
            StatusCode::OK,
            json!({
                "statusCode": 200,
                "message": "success",
                "link": link_json(domain, link)
            }),
        ),
        None => not_found(),
    }
}

async fn stats(state: &AppState, domain: &str, filter: Option<&str>, limit: Option<&str>) -> Reply {
    let limit = limit.and_then(|l| l.parse::<usize>().ok()).unwrap_or(100);
    let db = state.db.read().await;

    let mut links: Vec<&Link> = db.links.iter().collect();
    match filter.unwrap_or("top") {
        "bottom" => links.sort_by_key(|l| l.clicks),
        "last" => links.reverse(),
        // creation order stands in for random order
        "rand" | "random" => {}
        _ => links.sort_by(|a, b| b.clicks.cmp(&a.clicks)),
    }

    let entries: serde_json::Map<String, Value> = links
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, link)| (format!("link_{}", i + 1), link_json(domain, link)))
        .collect();

    reply(
        StatusCode::OK,
        json!({
            "links": entries,
            "stats": {
                "total_links": db.links.len().to_string(),
                "total_clicks": db.total_clicks().to_string()
            },
            "statusCode": 200,
            "message": "success"
        }),
    )
}

async fn db_stats(state: &AppState) -> Reply {
    let db = state.db.read().await;
    reply(
        StatusCode::OK,
        json!({
            "db-stats": {
                "total_links": db.links.len().to_string(),
                "total_clicks": db.total_clicks().to_string()
            },
            "statusCode": 200,
            "message": "success"
        }),
    )
}

async fn delete(state: &AppState, shorturl: Option<&str>) -> Reply {
    let Some(keyword) = shorturl.map(keyword_of) else {
        return missing_param("shorturl");
    };
    let mut db = state.db.write().await;
    let before = db.links.len();
    db.links.retain(|l| l.keyword != keyword);
    if db.links.len() == before {
        return plugin_not_found(keyword);
    }
    reply(
        StatusCode::OK,
        json!({"status": "success", "message": format!("{keyword} deleted"), "statusCode": 200}),
    )
}

async fn update(state: &AppState, shorturl: Option<&str>, url: Option<&str>) -> Reply {
    let (Some(keyword), Some(url)) = (shorturl.map(keyword_of), url) else {
        return missing_param("shorturl and url");
    };
    let mut db = state.db.write().await;
    match db.find_mut(keyword) {
        Some(link) => {
            link.url = url.to_string();
            reply(
                StatusCode::OK,
                json!({"status": "success", "message": format!("{keyword} now points to {url}"), "statusCode": 200}),
            )
        }
        None => plugin_not_found(keyword),
    }
}

async fn lookup(state: &AppState, substr: Option<&str>) -> Reply {
    let Some(substr) = substr else {
        return missing_param("substr");
    };
    let db = state.db.read().await;
    let keywords: Vec<&str> = db
        .links
        .iter()
        .filter(|l| l.url.contains(substr))
        .map(|l| l.keyword.as_str())
        .collect();
    reply(
        StatusCode::OK,
        json!({"status": "success", "keywords": keywords, "statusCode": 200}),
    )
}

/// Follow a short link, counting the click.
async fn follow(State(state): State<AppState>, Path(keyword): Path<String>) -> Response {
    let mut db = state.db.write().await;
    match db.find_mut(&keyword) {
        Some(link) => {
            link.clicks += 1;
            Redirect::permanent(&link.url).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn link_json(domain: &str, link: &Link) -> Value {
    json!({
        "shorturl": format!("{domain}/{}", link.keyword),
        "url": link.url,
        "title": link.title,
        "timestamp": link.timestamp,
        "ip": link.ip,
        "clicks": link.clicks.to_string()
    })
}

fn not_found() -> Reply {
    reply(
        StatusCode::NOT_FOUND,
        json!({
            "statusCode": 404,
            "errorCode": "404",
            "message": "Error: short URL not found"
        }),
    )
}

fn plugin_not_found(keyword: &str) -> Reply {
    reply(
        StatusCode::NOT_FOUND,
        json!({"status": "fail", "message": format!("error: keyword {keyword} not found"), "statusCode": 404}),
    )
}

fn missing_param(name: &str) -> Reply {
    reply(
        StatusCode::BAD_REQUEST,
        json!({"status": "fail", "message": format!("missing {name} parameter"), "statusCode": 400}),
    )
}

/// Empty form fields count as absent, as in PHP.
fn given(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

/// Accepts either a bare keyword or a full short URL.
fn keyword_of(shorturl: &str) -> &str {
    shorturl.trim_end_matches('/').rsplit('/').next().unwrap_or(shorturl)
}

fn domain_from_headers(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
