use std::{fmt, sync::Arc, thread, time::Duration};

use log::{debug, trace, warn};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    endpoints::make_url,
    error::{ApiError, SurveyMontyError},
    transport::{HttpTransport, TransportRequest},
};

/// Per-call request options: extra headers, query string, JSON body, timeout.
///
/// Everything except the headers reaches the transport untouched. Headers are
/// merged with the mandatory auth headers, see [`finalize_headers`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyMontyError::Config`] if the name or value is not a
    /// valid HTTP header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, SurveyMontyError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| SurveyMontyError::Config(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| SurveyMontyError::Config(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets a query parameter, replacing any previous values for `key`.
    pub fn set_query(&mut self, key: &str, value: impl ToString) {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.to_string()));
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `payload` as the JSON request body.
    pub fn json<T: Serialize>(self, payload: &T) -> Result<Self, SurveyMontyError> {
        Ok(self.body(serde_json::to_value(payload)?))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Returns `headers` plus `Authorization: Bearer <token>` and
/// `Content-Type: application/json`. Caller values for those two are replaced.
///
/// # Errors
///
/// Returns [`SurveyMontyError::Config`] if the token cannot be sent as a header.
pub fn finalize_headers(headers: &HeaderMap, access_token: &str) -> Result<HeaderMap, SurveyMontyError> {
    let mut finalized = headers.clone();
    let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
        .map_err(|e| SurveyMontyError::Config(format!("invalid access token: {e}")))?;
    bearer.set_sensitive(true);
    finalized.insert(AUTHORIZATION, bearer);
    finalized.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(finalized)
}

/// How often a success response with an undecodable body is re-requested.
///
/// The default is no retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeRetry {
    pub attempts: u32,
    /// Sleep before the first retry; doubled for each further one.
    pub delay: Duration,
}

/// Sends requests for one client: resolves URLs, authenticates, checks the
/// response and decodes the payload.
pub struct Executor {
    transport: Arc<dyn HttpTransport>,
    host: String,
    version: String,
    access_token: String,
    retry: DecodeRetry,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("host", &self.host)
            .field("version", &self.version)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        host: impl Into<String>,
        version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            host: host.into(),
            version: version.into(),
            access_token: access_token.into(),
            retry: DecodeRetry::default(),
        }
    }

    pub fn with_decode_retry(mut self, retry: DecodeRetry) -> Self {
        self.retry = retry;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Performs `method` on `endpoint` (already interpolated) and returns the
    /// decoded JSON payload as is.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on a non-success status, never retried.
    /// - [`ApiError::NoJsonPayload`] when the body is not JSON.
    /// - [`SurveyMontyError::Request`] when the transport fails.
    pub fn execute(
        &self,
        method: &Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, SurveyMontyError> {
        let request = TransportRequest {
            method: method.clone(),
            url: make_url(&self.host, &self.version, endpoint),
            headers: finalize_headers(&options.headers, &self.access_token)?,
            query: options.query,
            body: options.body,
            timeout: options.timeout,
        };

        let mut attempt = 0;
        let mut delay = self.retry.delay;
        loop {
            trace!("{} {}", request.method, request.url);
            let response = self.transport.send(&request)?;

            if !response.is_success() {
                return Err(ApiError::Http {
                    status: response.status,
                    body: response.text(),
                }
                .into());
            }

            match response.json() {
                Ok(payload) => {
                    debug!("response for {method} {endpoint} {payload:?}");
                    return Ok(payload);
                }
                Err(_) if attempt < self.retry.attempts => {
                    attempt += 1;
                    warn!(
                        "no JSON payload for {method} {endpoint}, retry {attempt}/{}",
                        self.retry.attempts
                    );
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    delay = delay.saturating_mul(2);
                }
                Err(_) => {
                    return Err(ApiError::NoJsonPayload {
                        status: response.status,
                        body: response.text(),
                    }
                    .into());
                }
            }
        }
    }
}
