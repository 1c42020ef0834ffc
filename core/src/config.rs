//! Client configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint, credentials and timeout for a `YourlsClient`.
///
/// Deserializes from `{ api_url, username, password, timeout_secs? }` so an
/// embedding application can keep it in its own config file.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawConfig")]
pub struct ClientConfig {
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: &str, username: &str, password: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API URL with trailing slashes removed, after checking that it is
    /// an HTTP(S) URL. The scheme check ignores ASCII case.
    pub(crate) fn endpoint(&self) -> Result<String, ApiError> {
        let http_scheme = self
            .api_url
            .get(..4)
            .is_some_and(|s| s.eq_ignore_ascii_case("http"));
        if !http_scheme {
            return Err(ApiError::Configuration {
                url: self.api_url.clone(),
            });
        }
        Ok(self.api_url.trim_end_matches('/').to_string())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct RawConfig {
    api_url: String,
    username: String,
    password: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl From<RawConfig> for ClientConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            api_url: raw.api_url,
            username: raw.username,
            password: raw.password,
            timeout: Duration::from_secs(raw.timeout_secs),
        }
    }
}
