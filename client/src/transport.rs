//! The HTTP layer the executor talks to.
//!
//! [`HttpTransport`] is the seam between the client and the network. The
//! default implementation wraps a blocking `reqwest` client; tests swap in a
//! recording transport.

use std::time::Duration;

use reqwest::{
    blocking::Client,
    header::HeaderMap,
    Method, StatusCode,
};
use serde_json::Value;

use crate::error::SurveyMontyError;

/// A fully resolved request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Anything that can carry a [`TransportRequest`] to the API.
///
/// Implementations must be thread-safe: one client, and so one transport,
/// may be shared across threads.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, SurveyMontyError>;
}

/// [`HttpTransport`] backed by `reqwest::blocking::Client`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, SurveyMontyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl From<Client> for ReqwestTransport {
    fn from(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, SurveyMontyError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send()?;
        let status = response.status();
        let body = response.bytes()?.to_vec();
        Ok(TransportResponse { status, body })
    }
}
