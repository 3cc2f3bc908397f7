//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence Cloud/Server REST API
//! with basic (user + API token) or bearer (personal access token)
//! authentication.

mod pages;

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cfmd_config::Credentials;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use ureq::Agent;

use crate::error::ConfluenceError;
use crate::retry::RetryPolicy;

/// How requests are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Basic base64(user:token)`.
    Basic,
    /// `Authorization: Bearer token`.
    Bearer,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("basic (user + API token)"),
            Self::Bearer => f.write_str("bearer (personal access token)"),
        }
    }
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
    scheme: AuthScheme,
    retry: RetryPolicy,
}

impl ConfluenceClient {
    /// Create client from resolved credentials.
    ///
    /// A username selects basic auth, otherwise the token is sent as a
    /// bearer token. `timeout` bounds each HTTP request.
    #[must_use]
    pub fn new(credentials: &Credentials, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let (scheme, auth_header) = authorization(credentials);

        Self {
            agent,
            base_url: credentials.url.trim_end_matches('/').to_owned(),
            auth_header,
            scheme,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the backoff delays between retries.
    #[cfg(test)]
    pub(crate) fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry = RetryPolicy::with_delays(delays);
        self
    }

    /// Authentication scheme in use.
    #[must_use]
    pub fn auth_scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Server base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// GET a JSON resource, retrying transient failures.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        let mut retries = 0;
        loop {
            match self.send_get(url) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let Some(delay) = self.retry.delay_for(retries, &err) else {
                        return Err(err);
                    };
                    retries += 1;
                    warn!(
                        "{err}; retrying in {:.1}s (attempt {}/{})",
                        delay.as_secs_f64(),
                        retries + 1,
                        self.retry.max_attempts()
                    );
                    std::thread::sleep(delay);
                }
            }
        }
    }

    fn send_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        debug!("GET {url}");

        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::response(status, &error_body, retry_after));
        }

        Ok(body_reader.read_json()?)
    }
}

fn authorization(credentials: &Credentials) -> (AuthScheme, String) {
    match &credentials.user {
        Some(user) => {
            let encoded = STANDARD.encode(format!("{user}:{}", credentials.token));
            (AuthScheme::Basic, format!("Basic {encoded}"))
        }
        None => (AuthScheme::Bearer, format!("Bearer {}", credentials.token)),
    }
}
