use reqwest::StatusCode;
use thiserror::Error;

/// Message carried by [`ApiError::NoJsonPayload`].
pub const NO_JSON_PAYLOAD: &str = "unexpected SurveyMonkey API response, no JSON payload";

/// Failures reported by the SurveyMonkey API itself.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API answered with a non-success HTTP status. The raw body is kept
    /// for diagnostics.
    #[error("api error ({status}): {body}")]
    Http { status: StatusCode, body: String },
    /// The status was a success but the body could not be decoded as JSON.
    #[error("{}", NO_JSON_PAYLOAD)]
    NoJsonPayload { status: StatusCode, body: String },
    /// The payload decoded fine but lacks the expected `data` member.
    #[error("response envelope has no data: {0}")]
    MissingData(serde_json::Value),
}

impl ApiError {
    /// Raw response body, when the error came from an HTTP response.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Http { body, .. } | ApiError::NoJsonPayload { body, .. } => Some(body),
            ApiError::MissingData(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } | ApiError::NoJsonPayload { status, .. } => Some(*status),
            ApiError::MissingData(_) => None,
        }
    }
}

/// A custom error type for the SurveyMonkey API client.
#[derive(Error, Debug)]
pub enum SurveyMontyError {
    /// A synthesized function was called with the wrong number of path arguments.
    #[error("{function} expects {expected} arg(s) but received {received}")]
    Argument {
        function: String,
        expected: usize,
        received: usize,
    },
    /// An error returned by the API.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// An error occurred while making a request.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    /// The library is misconfigured: bad endpoint document, bad header, bad environment.
    #[error("configuration error: {0}")]
    Config(String),
    /// No function with this name exists in the client's table.
    #[error("unknown API function: {0}")]
    UnknownFunction(String),
    /// A URL template placeholder had no value to substitute.
    #[error("no value for path parameter `{placeholder}`")]
    Format { placeholder: String },
    /// An error occurred while serializing or deserializing data.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SurveyMontyError {
    /// True for failures reported by the API (bad status, undecodable body).
    pub fn is_api_error(&self) -> bool {
        matches!(self, SurveyMontyError::Api(_))
    }

    /// True when the call site passed the wrong number of path arguments.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, SurveyMontyError::Argument { .. })
    }

    /// True for library-side problems that no retry will fix.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SurveyMontyError::Config(_)
                | SurveyMontyError::UnknownFunction(_)
                | SurveyMontyError::Format { .. }
                | SurveyMontyError::Serde(_)
                | SurveyMontyError::Io(_)
        )
    }
}
