//! Client configuration.

use std::env;
use std::time::Duration;

/// Public Apify API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.apify.com";

/// Request timeout used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(360);

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "APIFY_TOKEN";

/// Environment variable overriding the API URL.
pub const API_URL_ENV: &str = "APIFY_API_BASE_URL";

/// Settings for an [`ApifyClient`](crate::ApifyClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// API token. Public resources can be read without one.
    pub token: Option<String>,
    /// API URL without the version suffix (e.g. `https://api.apify.com`).
    pub api_url: String,
    /// Timeout for a single request.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Read configuration from `APIFY_TOKEN` and `APIFY_API_BASE_URL`.
    ///
    /// Both variables are optional; unset or empty values fall back to the
    /// defaults.
    pub fn from_env() -> Self {
        let token = env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        let api_url = env::var(API_URL_ENV)
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            token,
            api_url,
            ..Default::default()
        }
    }

    /// Set the token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the API URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
