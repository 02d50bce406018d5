//! FetchClientBuilder for fluent FetchClient configuration
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use nestkit::http::FetchClientBuilder;
//!
//! let client = FetchClientBuilder::new()
//!     .timeout(Duration::from_secs(3))
//!     .delay(Duration::ZERO)
//!     .user_agent("nestkit-demo")
//!     .header("Accept", "application/json")
//!     .build()
//!     .unwrap();
//! assert_eq!(client.timeout(), Duration::from_secs(3));
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;

use super::{FetchClient, DEFAULT_DELAY, DEFAULT_TIMEOUT};
use crate::error::{NestKitError, Result};

/// Builder for [`FetchClient`]
///
/// Defaults match the per-call defaults: an 8000 ms deadline and a 100 ms
/// delay before each request.
#[derive(Debug, Clone)]
pub struct FetchClientBuilder {
    /// Deadline for each call, measured from call entry
    timeout: Duration,
    /// Pause before each request is issued
    delay: Duration,
    /// Connection establishment timeout
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    /// Headers sent with every request
    headers: Vec<(String, String)>,
}

impl Default for FetchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClientBuilder {
    pub fn new() -> Self {
        FetchClientBuilder {
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            connect_timeout: None,
            user_agent: None,
            headers: Vec::new(),
        }
    }

    /// Set the default deadline; must be non-zero
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default pause before each request
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Validate the configuration and build the client
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero timeout, a header name or
    /// value that is not valid HTTP, or an HTTP client that cannot be created.
    pub fn build(self) -> Result<FetchClient> {
        if self.timeout.is_zero() {
            return Err(NestKitError::configuration("timeout must be greater than zero"));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| NestKitError::configuration(format!("Invalid header name: {}", name)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| NestKitError::configuration(format!("Invalid value for header {}", name)))?;
            headers.insert(header_name, header_value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("nestkit/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = Client::builder()
            .redirect(Policy::none())
            .default_headers(headers)
            .user_agent(user_agent);
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let http = builder
            .build()
            .map_err(|e| NestKitError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(FetchClient::from_parts(http, self.timeout, self.delay))
    }
}
