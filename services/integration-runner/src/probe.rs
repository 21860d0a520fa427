//! HTTP probe.
//!
//! Executes exactly one HTTP exchange per [`ProbeRequest`] and always
//! returns a [`ProbeOutcome`]: network-level problems never surface as
//! errors, and non-2xx statuses are ordinary responses.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Method};
use rust_common::{HttpConfig, PlatformError, build_http_client};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Cause reported when a probe exceeds its deadline.
pub const TIMEOUT_CAUSE: &str = "timeout";

/// Characters of body kept in diagnostic summaries.
const SUMMARY_BODY_CHARS: usize = 200;

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeBody {
    /// Serialized as JSON with a matching content type
    Json(Value),
    /// Sent verbatim
    Raw(Vec<u8>),
}

/// A single HTTP request description. Built per call and consumed by
/// [`HttpProbe::probe`], so headers never leak between probes.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute target URL
    pub url: Url,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Optional body
    pub body: Option<ProbeBody>,
    /// Deadline for the whole exchange
    pub timeout: Duration,
}

impl ProbeRequest {
    /// Create a request with no headers or body.
    #[must_use]
    pub const fn new(method: Method, url: Url, timeout: Duration) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            body: None,
            timeout,
        }
    }

    /// `GET url`.
    #[must_use]
    pub const fn get(url: Url, timeout: Duration) -> Self {
        Self::new(Method::GET, url, timeout)
    }

    /// `POST url` with a JSON body.
    #[must_use]
    pub fn post_json(url: Url, body: Value, timeout: Duration) -> Self {
        Self::new(Method::POST, url, timeout).with_body(ProbeBody::Json(body))
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: ProbeBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Append query parameters.
    #[must_use]
    pub fn with_query(mut self, params: &[(&str, &str)]) -> Self {
        self.url.query_pairs_mut().extend_pairs(params);
        self
    }
}

/// Normalized result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered (any status)
    Responded {
        /// HTTP status code
        status_code: u16,
        /// Response headers, names lowercased
        headers: BTreeMap<String, String>,
        /// Raw response body
        body: Vec<u8>,
    },
    /// No HTTP response was obtained
    TransportFailure {
        /// Human-readable cause; exactly `"timeout"` on deadline expiry
        cause: String,
    },
}

impl ProbeOutcome {
    /// Build a response outcome.
    #[must_use]
    pub fn responded(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::Responded {
            status_code,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Build a transport failure outcome.
    #[must_use]
    pub fn transport_failure(cause: impl Into<String>) -> Self {
        Self::TransportFailure {
            cause: cause.into(),
        }
    }

    /// Status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Responded { status_code, .. } => Some(*status_code),
            Self::TransportFailure { .. } => None,
        }
    }

    /// Whether the server answered with `status`.
    #[must_use]
    pub fn has_status(&self, status: u16) -> bool {
        self.status() == Some(status)
    }

    /// Response header by (case-insensitive) name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            Self::Responded { headers, .. } => {
                headers.get(&name.to_ascii_lowercase()).map(String::as_str)
            }
            Self::TransportFailure { .. } => None,
        }
    }

    /// Raw body, if the server answered.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Responded { body, .. } => Some(body),
            Self::TransportFailure { .. } => None,
        }
    }

    /// Body as lossy UTF-8 text (empty for transport failures).
    #[must_use]
    pub fn text(&self) -> String {
        self.body()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    /// Decode the body as a JSON document. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] for transport failures or non-JSON bodies.
    pub fn json(&self) -> Result<Value, PlatformError> {
        match self {
            Self::Responded { body, .. } if body.iter().all(u8::is_ascii_whitespace) => {
                Ok(Value::Null)
            }
            Self::Responded { body, .. } => Ok(serde_json::from_slice(body)?),
            Self::TransportFailure { cause } => Err(PlatformError::invalid_input(format!(
                "no response body: {cause}"
            ))),
        }
    }

    /// One-line diagnostic: status and a truncated body, or the cause.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Responded { status_code, .. } => {
                let text = self.text();
                let mut excerpt: String = text.chars().take(SUMMARY_BODY_CHARS).collect();
                if text.chars().count() > SUMMARY_BODY_CHARS {
                    excerpt.push_str("...");
                }
                format!("Status: {status_code}, Response: {excerpt}")
            }
            Self::TransportFailure { cause } => format!("transport failure: {cause}"),
        }
    }
}

/// Issues probes over a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Build a probe from HTTP client settings.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Execute one exchange. Never fails: connection, DNS, protocol, and
    /// deadline problems become [`ProbeOutcome::TransportFailure`].
    pub async fn probe(&self, request: ProbeRequest) -> ProbeOutcome {
        let ProbeRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        debug!(%method, %url, timeout_ms = timeout.as_millis(), "probe");

        let mut builder = self.client.request(method, url).timeout(timeout);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match body {
            Some(ProbeBody::Json(value)) => builder.json(&value),
            Some(ProbeBody::Raw(bytes)) => builder.body(bytes),
            None => builder,
        };

        let exchange = async {
            let response = builder.send().await?;
            let status_code = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_ascii_lowercase(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response.bytes().await?.to_vec();
            Ok::<_, reqwest::Error>(ProbeOutcome::Responded {
                status_code,
                headers,
                body,
            })
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => ProbeOutcome::TransportFailure {
                cause: transport_cause(&err),
            },
            Err(_) => ProbeOutcome::transport_failure(TIMEOUT_CAUSE),
        }
    }
}

fn transport_cause(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        TIMEOUT_CAUSE.to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_bearer_header() {
        let request = ProbeRequest::get(url("http://localhost/me"), Duration::from_secs(1))
            .bearer("abc");
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_query_params_appended() {
        let request = ProbeRequest::get(
            url("http://localhost/api/v1/tags/search"),
            Duration::from_secs(1),
        )
        .with_query(&[("q", "test"), ("type", "fandom")]);
        assert_eq!(request.url.query(), Some("q=test&type=fandom"));
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let outcome = ProbeOutcome::responded(204, Vec::new());
        assert_eq!(outcome.json().unwrap(), Value::Null);
    }

    #[test]
    fn test_transport_failure_has_no_status() {
        let outcome = ProbeOutcome::transport_failure(TIMEOUT_CAUSE);
        assert_eq!(outcome.status(), None);
        assert!(outcome.json().is_err());
        assert_eq!(outcome.summary(), "transport failure: timeout");
    }

    #[test]
    fn test_summary_truncates_body() {
        let outcome = ProbeOutcome::responded(500, "x".repeat(500));
        let summary = outcome.summary();
        assert!(summary.starts_with("Status: 500, Response: "));
        assert!(summary.ends_with("..."));
        assert!(summary.len() < 260);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = BTreeMap::new();
        headers.insert("x-proxy-service".to_string(), "work-service".to_string());
        let outcome = ProbeOutcome::Responded {
            status_code: 200,
            headers,
            body: Vec::new(),
        };
        assert_eq!(outcome.header("X-Proxy-Service"), Some("work-service"));
    }
}
