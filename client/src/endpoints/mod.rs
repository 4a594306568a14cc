pub mod endpoint;
pub mod template;

pub use endpoint::ApiFunction;
pub use template::{clean_url_fragment, make_full_endpoint, make_url, parse_path_params};

use std::{collections::HashMap, collections::HashSet, fs, path::Path, sync::Arc};

use once_cell::sync::{Lazy, OnceCell};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::SurveyMontyError;

/// API version used when none is given.
pub const DEFAULT_VERSION: &str = "v3";
/// SurveyMonkey API host.
pub const DEFAULT_HOST: &str = "https://api.surveymonkey.net";

/// Endpoint documents compiled into the library, keyed by version.
const BUNDLED_VERSIONS: &[(&str, &str)] = &[("v3", include_str!("../versions/v3.json"))];

/// Parsed documents, keyed by version, each filled at most once.
type VersionCache = HashMap<&'static str, (&'static str, OnceCell<Arc<VersionConfig>>)>;

static VERSION_CACHE: Lazy<VersionCache> = Lazy::new(|| {
    BUNDLED_VERSIONS
        .iter()
        .map(|(version, document)| (*version, (*document, OnceCell::new())))
        .collect()
});

/// One API operation: its public name, URL template and HTTP verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub name: String,
    /// URL template, e.g. `/surveys/{survey_id}/details`.
    pub endpoint: String,
    pub method: String,
}

impl EndpointSpec {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            method: method.into(),
        }
    }

    /// Parses the verb. Case-insensitive: `get` and `GET` are the same method.
    pub fn http_method(&self) -> Result<Method, SurveyMontyError> {
        Method::from_bytes(self.method.to_ascii_uppercase().as_bytes()).map_err(|_| {
            SurveyMontyError::Config(format!(
                "endpoint `{}` has invalid HTTP method `{}`",
                self.name, self.method
            ))
        })
    }
}

/// The ordered list of endpoints available in one API version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConfig {
    pub endpoints: Vec<EndpointSpec>,
}

impl VersionConfig {
    /// Parses and validates an endpoint document.
    pub fn from_json(document: &str) -> Result<Self, SurveyMontyError> {
        let config: VersionConfig = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads an endpoint document from disk. The result is not cached.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SurveyMontyError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Checks that names are non-empty and unique and that every verb parses.
    pub fn validate(&self) -> Result<(), SurveyMontyError> {
        let mut seen = HashSet::new();
        for spec in &self.endpoints {
            if spec.name.trim().is_empty() {
                return Err(SurveyMontyError::Config(format!(
                    "endpoint `{}` has an empty name",
                    spec.endpoint
                )));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(SurveyMontyError::Config(format!(
                    "duplicate endpoint name `{}`",
                    spec.name
                )));
            }
            spec.http_method()?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EndpointSpec> {
        self.endpoints.iter().find(|spec| spec.name == name)
    }
}

/// Versions shipped with the library.
pub fn bundled_versions() -> impl Iterator<Item = &'static str> {
    BUNDLED_VERSIONS.iter().map(|(version, _)| *version)
}

/// Loads the bundled endpoint document for `version`.
///
/// Each version is parsed at most once per process; later calls share the
/// same [`Arc`].
///
/// # Errors
///
/// Returns [`SurveyMontyError::Config`] for a version the library does not
/// ship, or if the bundled document fails validation.
pub fn load_version_config(version: &str) -> Result<Arc<VersionConfig>, SurveyMontyError> {
    let key = template::clean_url_fragment(version);
    let (document, cell) = VERSION_CACHE
        .get(key)
        .ok_or_else(|| SurveyMontyError::Config(format!("unsupported API version `{version}`")))?;

    cell.get_or_try_init(|| {
        log::debug!("loading endpoint config for {key}");
        VersionConfig::from_json(document).map(Arc::new)
    })
    .cloned()
}
