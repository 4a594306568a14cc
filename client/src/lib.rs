//! Client for the SurveyMonkey REST API.
//!
//! Endpoints are not hand-written: each API version ships an endpoint document
//! (name, URL template, HTTP method) and the client synthesizes one
//! [`ApiFunction`] per entry when it is built.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod pagination;
pub mod request;
pub mod transport;

// Re-export commonly used types
pub use client::SurveyMontyClient;
pub use config::ClientConfig;
pub use endpoints::{
    load_version_config, ApiFunction, EndpointSpec, VersionConfig, DEFAULT_HOST, DEFAULT_VERSION,
};
pub use error::{ApiError, SurveyMontyError};
pub use request::{finalize_headers, RequestOptions};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
