use std::{fmt, sync::Arc};

use reqwest::Method;
use serde_json::Value;

use super::{template, EndpointSpec};
use crate::{
    error::SurveyMontyError,
    request::{Executor, RequestOptions},
};

/// A callable synthesized from one [`EndpointSpec`].
///
/// Holds the parsed path parameters of the URL template and the executor of
/// the client it belongs to. Calling it checks the number of positional
/// arguments against the template before any request is made.
#[derive(Clone)]
pub struct ApiFunction {
    name: String,
    method: Method,
    template: String,
    path_params: Vec<String>,
    executor: Arc<Executor>,
}

impl ApiFunction {
    /// Binds `spec` to `executor`.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyMontyError::Config`] if the spec's HTTP method is invalid.
    pub fn from_spec(spec: &EndpointSpec, executor: Arc<Executor>) -> Result<Self, SurveyMontyError> {
        Ok(Self {
            name: spec.name.clone(),
            method: spec.http_method()?,
            template: spec.endpoint.clone(),
            path_params: template::parse_path_params(&spec.endpoint),
            executor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// Number of positional arguments the function takes.
    pub fn arity(&self) -> usize {
        self.path_params.len()
    }

    /// Interpolates `args` into the template after checking their count.
    pub fn endpoint_for(&self, args: &[&str]) -> Result<String, SurveyMontyError> {
        if args.len() != self.path_params.len() {
            return Err(SurveyMontyError::Argument {
                function: self.name.clone(),
                expected: self.path_params.len(),
                received: args.len(),
            });
        }
        template::make_full_endpoint(&self.template, &self.path_params, args)
    }

    /// Calls the endpoint with positional path arguments and request options.
    ///
    /// # Errors
    ///
    /// [`SurveyMontyError::Argument`] when `args` does not match the template,
    /// in which case nothing is sent. Otherwise whatever
    /// [`Executor::execute`] returns.
    pub fn call(&self, args: &[&str], options: RequestOptions) -> Result<Value, SurveyMontyError> {
        let endpoint = self.endpoint_for(args)?;
        self.executor.execute(&self.method, &endpoint, options)
    }
}

impl fmt::Debug for ApiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiFunction")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("template", &self.template)
            .field("path_params", &self.path_params)
            .finish()
    }
}

impl fmt::Display for ApiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
