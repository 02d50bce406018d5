//! Fetch wrapper
//!
//! Wraps JSON GET requests with a per-call deadline, an optional caller abort
//! signal, a pause before each request and a structured [`FetchError`] for
//! every failure.
//!
//! ## Features
//!
//! - **Deadline**: measured from call entry, so the pre-request delay counts
//! - **Cancellation**: an [`AbortSignal`] races the deadline; the first to fire wins
//! - **No redirects**: a 3xx is reported as a failure, never followed
//! - **No retries**: every call issues exactly one request
//!
//! ```rust,no_run
//! use nestkit::http::{handle_fetch, FetchOptions};
//!
//! # async fn run() {
//! match handle_fetch("https://api.example.com/users", "user_list", vec![], FetchOptions::default()).await {
//!     Ok(users) => println!("{}", users),
//!     Err(error) => eprintln!("{} ({})", error.message, error.status),
//! }
//! # }
//! ```

pub mod abort;
pub mod builder;
pub mod error;

pub use abort::{AbortController, AbortSignal};
pub use builder::FetchClientBuilder;
pub use error::{status_class, status_message, FetchError, FetchFailure, StatusClass};

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::NestKitError;

/// Default deadline for a fetch call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Default pause before each request
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Outcome of a fetch call
pub type FetchResult = std::result::Result<Value, FetchError>;

static SHARED_CLIENT: LazyLock<FetchClient> = LazyLock::new(FetchClient::new);

/// Per-call options; unset fields fall back to the client's defaults
///
/// A zero timeout or a header that is not valid HTTP rejects the call with
/// [`FetchFailure::InvalidRequest`] before anything is sent.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub timeout: Option<Duration>,
    pub delay: Option<Duration>,
    pub abort_signal: Option<AbortSignal>,
    pub headers: Vec<(String, String)>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort_signal = Some(signal);
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Methods accepted by [`FetchClient::fetch_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = NestKitError;

    /// Method names are matched exactly, in upper case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(NestKitError::InvalidMethod(other.to_string())),
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// One request as handed to [`FetchClient::execute`]
struct Call<'a> {
    method: Method,
    url: &'a str,
    source: &'a str,
    vars: Vec<Value>,
    body: Option<&'a Value>,
}

/// HTTP client for JSON fetches
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    timeout: Duration,
    delay: Duration,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Client with default settings
    pub fn new() -> Self {
        let http = Client::builder()
            .redirect(Policy::none())
            .user_agent(format!("nestkit/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to create HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self::from_parts(http, DEFAULT_TIMEOUT, DEFAULT_DELAY)
    }

    pub fn builder() -> FetchClientBuilder {
        FetchClientBuilder::new()
    }

    pub(crate) fn from_parts(http: Client, timeout: Duration, delay: Duration) -> Self {
        FetchClient { http, timeout, delay }
    }

    /// Default deadline for calls made through this client
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Default pause before each request
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// GET `url` and decode its JSON body
    ///
    /// Waits the configured delay, then issues the request. The deadline
    /// starts at call entry and races the caller's abort signal, if any.
    /// `source` and `vars` are copied into the error record on failure.
    ///
    /// # Errors
    ///
    /// - no response (transport failure, deadline, abort): status `429`,
    ///   status text `"TypeError: Failed to fetch"`
    /// - non-2xx response: its status, class and message
    /// - 2xx response with a body that is not JSON
    pub async fn handle_fetch(&self, url: &str, source: &str, vars: Vec<Value>, options: FetchOptions) -> FetchResult {
        let call = Call {
            method: Method::GET,
            url,
            source,
            vars,
            body: None,
        };
        self.execute(call, options).await
    }

    /// Plain GET decoding JSON, with no delay and no caller context
    pub async fn basic_fetch(&self, url: &str) -> FetchResult {
        let call = Call {
            method: Method::GET,
            url,
            source: "basic_fetch",
            vars: Vec::new(),
            body: None,
        };
        self.execute(call, FetchOptions::default().with_delay(Duration::ZERO)).await
    }

    /// Send `params` as a JSON body with `method`
    ///
    /// GET requests carry no body.
    pub async fn fetch_data(&self, url: &str, params: &Value, method: HttpMethod) -> FetchResult {
        let call = Call {
            method: method.into(),
            url,
            source: "fetch_data",
            vars: Vec::new(),
            body: (method != HttpMethod::Get).then_some(params),
        };
        self.execute(call, FetchOptions::default().with_delay(Duration::ZERO)).await
    }

    async fn execute(&self, call: Call<'_>, options: FetchOptions) -> FetchResult {
        let timeout = options.timeout.unwrap_or(self.timeout);
        let delay = options.delay.unwrap_or(self.delay);

        let rejected = |detail: String| {
            warn!("Rejected fetch of {}: {}", call.url, detail);
            FetchError::invalid_request(call.source, call.url, call.vars.clone(), detail)
        };
        if timeout.is_zero() {
            return Err(rejected("timeout must be greater than zero".to_string()));
        }
        let headers = header_map(&options.headers).map_err(rejected)?;

        let abort = async {
            match &options.abort_signal {
                Some(signal) => signal.aborted().await,
                None => std::future::pending::<()>().await,
            }
        };

        // abort is polled first so a signal fired before the call wins
        tokio::select! {
            biased;
            _ = abort => {
                warn!("Fetch aborted: {}", call.url);
                Err(FetchError::no_response(call.source, call.url, call.vars.clone(), Some("aborted".to_string()))
                    .with_kind(FetchFailure::Aborted))
            }
            outcome = tokio::time::timeout(timeout, self.send(&call, delay, headers)) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    warn!("Fetch timed out after {:?}: {}", timeout, call.url);
                    Err(FetchError::no_response(
                        call.source,
                        call.url,
                        call.vars.clone(),
                        Some(format!("timed out after {} ms", timeout.as_millis())),
                    )
                    .with_kind(FetchFailure::Timeout))
                }
            }
        }
    }

    async fn send(&self, call: &Call<'_>, delay: Duration, headers: HeaderMap) -> FetchResult {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        debug!("{} {} (source: {})", call.method, call.url, call.source);
        let mut request = self.http.request(call.method.clone(), call.url).headers(headers);
        if let Some(body) = call.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Fetch failed for {}: {}", call.url, e);
            FetchError::no_response(call.source, call.url, call.vars.clone(), Some(e.to_string()))
        })?;

        let status = response.status();
        debug!("Fetch response {} from {}", status, call.url);
        if !status.is_success() {
            return Err(FetchError::from_status(
                call.source,
                call.url,
                call.vars.clone(),
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            FetchError::no_response(call.source, call.url, call.vars.clone(), Some(e.to_string()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Malformed JSON body from {}: {}", call.url, e);
            FetchError::malformed_body(call.source, call.url, call.vars.clone(), status.as_u16(), e.to_string())
        })
    }
}

/// Validate per-call headers, naming the first bad one
fn header_map(headers: &[(String, String)]) -> std::result::Result<HeaderMap, String> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| format!("Invalid header name: {}", name))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| format!("Invalid value for header {}", name))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

/// [`FetchClient::handle_fetch`] on a lazily built shared client
pub async fn handle_fetch(url: &str, source: &str, vars: Vec<Value>, options: FetchOptions) -> FetchResult {
    SHARED_CLIENT.handle_fetch(url, source, vars, options).await
}

/// [`FetchClient::basic_fetch`] on the shared client
pub async fn basic_fetch(url: &str) -> FetchResult {
    SHARED_CLIENT.basic_fetch(url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);

        let err = "PATCH".parse::<HttpMethod>().unwrap_err();
        assert!(matches!(err, NestKitError::InvalidMethod(ref m) if m == "PATCH"));
        assert!("get".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(Method::from(HttpMethod::Post), Method::POST);
    }

    #[test]
    fn test_options_builders() {
        let controller = AbortController::new();
        let options = FetchOptions::new()
            .with_timeout(Duration::from_millis(10))
            .with_delay(Duration::ZERO)
            .with_abort_signal(controller.signal())
            .with_header("Accept", "application/json");

        assert_eq!(options.timeout, Some(Duration::from_millis(10)));
        assert_eq!(options.delay, Some(Duration::ZERO));
        assert!(options.abort_signal.is_some());
        assert_eq!(options.headers, vec![("Accept".to_string(), "application/json".to_string())]);

        let defaults = FetchOptions::default();
        assert!(defaults.timeout.is_none() && defaults.delay.is_none());
    }

    #[tokio::test]
    async fn test_pre_aborted_signal_wins() {
        let controller = AbortController::new();
        controller.abort();

        let client = FetchClient::new();
        let options = FetchOptions::default().with_abort_signal(controller.signal());
        let err = client
            .handle_fetch("http://127.0.0.1:9/never", "aborted_test", vec![json!("x")], options)
            .await
            .unwrap_err();

        assert!(err.is_aborted());
        assert_eq!(err.status, 429);
        assert_eq!(err.origin, "aborted_test");
        assert_eq!(err.vars, vec![json!("x")]);
    }

    #[tokio::test]
    async fn test_zero_timeout_is_rejected_before_sending() {
        let client = FetchClient::new();
        let options = FetchOptions::default().with_timeout(Duration::ZERO);
        let err = client
            .handle_fetch("http://127.0.0.1:9/zero", "zero_timeout", vec![], options)
            .await
            .unwrap_err();

        assert_eq!(err.kind, FetchFailure::InvalidRequest);
        assert_eq!(err.status, 0);
        assert!(!err.message.contains("Failed to fetch"));
    }

    #[tokio::test]
    async fn test_bad_header_is_rejected_before_sending() {
        let client = FetchClient::new();
        let options = FetchOptions::default()
            .with_delay(Duration::ZERO)
            .with_header("bad header", "x");
        let err = client
            .handle_fetch("http://127.0.0.1:9/headers", "bad_header", vec![], options)
            .await
            .unwrap_err();

        assert_eq!(err.kind, FetchFailure::InvalidRequest);
        assert_eq!(err.detail.as_deref(), Some("Invalid header name: bad header"));

        let options = FetchOptions::default().with_header("X-Ok", "line\nbreak");
        let err = client
            .handle_fetch("http://127.0.0.1:9/headers", "bad_header", vec![], options)
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchFailure::InvalidRequest);
    }

    #[test]
    fn test_header_map() {
        let headers = vec![("Accept".to_string(), "application/json".to_string())];
        let map = header_map(&headers).unwrap();
        assert_eq!(map.get("accept").and_then(|v| v.to_str().ok()), Some("application/json"));
        assert!(header_map(&[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_covers_delay() {
        let client = FetchClient::new();
        let options = FetchOptions::default()
            .with_delay(Duration::from_millis(500))
            .with_timeout(Duration::from_millis(20));
        let err = client
            .handle_fetch("http://127.0.0.1:9/slow", "timeout_test", vec![], options)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.status_text, "TypeError: Failed to fetch");
        assert!(err.message.contains("Failed to fetch"));
    }
}
