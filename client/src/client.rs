use std::{collections::HashMap, sync::Arc};

use serde_json::Value;

use crate::{
    config::ClientConfig,
    endpoints::{load_version_config, ApiFunction, VersionConfig},
    error::SurveyMontyError,
    request::{Executor, RequestOptions},
    transport::{HttpTransport, ReqwestTransport},
};

/// A client for the SurveyMonkey API.
///
/// The public surface is data driven: at construction every endpoint of the
/// version's endpoint document becomes an [`ApiFunction`], reachable by name
/// through [`function`](Self::function) and [`call`](Self::call). The table
/// is never modified afterwards, so a client can be shared across threads.
///
/// ```rust,no_run
/// use surveymonty::{RequestOptions, SurveyMontyClient};
///
/// let client = SurveyMontyClient::new("your-access-token")?;
/// let survey = client.call("get_survey", &["123456"], RequestOptions::new())?;
/// # Ok::<(), surveymonty::SurveyMontyError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SurveyMontyClient {
    version: String,
    functions: Vec<ApiFunction>,
    index: HashMap<String, usize>,
    max_pages: usize,
}

impl SurveyMontyClient {
    /// Creates a client for the default API version with default settings.
    pub fn new(access_token: impl Into<String>) -> Result<Self, SurveyMontyError> {
        Self::from_config(ClientConfig::new(access_token))
    }

    /// Creates a client using a blocking `reqwest` transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, SurveyMontyError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client for the bundled endpoint document of `config.version`.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, SurveyMontyError> {
        let endpoints = load_version_config(&config.version)?;
        Self::with_endpoints(config, &endpoints, transport)
    }

    /// Creates a client from a caller-supplied endpoint document.
    pub fn with_endpoints(
        config: ClientConfig,
        endpoints: &VersionConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, SurveyMontyError> {
        config.validate()?;
        endpoints.validate()?;

        let executor = Arc::new(
            Executor::new(transport, &config.host, &config.version, &config.access_token)
                .with_decode_retry(config.decode_retry()),
        );

        let functions = endpoints
            .endpoints
            .iter()
            .map(|spec| ApiFunction::from_spec(spec, Arc::clone(&executor)))
            .collect::<Result<Vec<_>, _>>()?;
        let index = functions
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect();

        log::debug!(
            "built {} API functions for {}",
            functions.len(),
            config.version
        );

        Ok(Self {
            version: config.version,
            functions,
            index,
            max_pages: config.max_pages,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub(crate) fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// The function named `name`, if the endpoint document defines one.
    pub fn function(&self, name: &str) -> Option<&ApiFunction> {
        self.index.get(name).map(|&i| &self.functions[i])
    }

    /// All functions, in endpoint document order.
    pub fn functions(&self) -> impl Iterator<Item = &ApiFunction> {
        self.functions.iter()
    }

    /// Calls the function named `name`.
    ///
    /// # Errors
    ///
    /// [`SurveyMontyError::UnknownFunction`] for a name the endpoint document
    /// does not define, otherwise see [`ApiFunction::call`].
    pub fn call(
        &self,
        name: &str,
        args: &[&str],
        options: RequestOptions,
    ) -> Result<Value, SurveyMontyError> {
        self.function(name)
            .ok_or_else(|| SurveyMontyError::UnknownFunction(name.to_string()))?
            .call(args, options)
    }
}

impl TryFrom<ClientConfig> for SurveyMontyClient {
    type Error = SurveyMontyError;

    fn try_from(config: ClientConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}

/// Typed wrappers for the bundled v3 endpoints. Arity is checked by the
/// compiler; each method forwards to [`SurveyMontyClient::call`].
macro_rules! endpoint_methods {
    ($( $name:ident ( $($param:ident),* ); )*) => {
        impl SurveyMontyClient {
            $(
                pub fn $name(
                    &self,
                    $($param: &str,)*
                    options: RequestOptions,
                ) -> Result<Value, SurveyMontyError> {
                    self.call(stringify!($name), &[$($param),*], options)
                }
            )*
        }

        #[cfg(test)]
        pub(crate) const TYPED_ENDPOINTS: &[(&str, usize)] = &[
            $( (stringify!($name), <[&str]>::len(&[$(stringify!($param)),*])) ),*
        ];
    };
}

endpoint_methods! {
    get_me();
    get_groups();
    get_group(group_id);
    get_group_members(group_id);
    get_group_member(group_id, member_id);
    get_surveys();
    create_survey();
    get_survey(survey_id);
    update_survey(survey_id);
    replace_survey(survey_id);
    delete_survey(survey_id);
    get_survey_details(survey_id);
    get_survey_categories();
    get_survey_templates();
    get_survey_languages();
    get_survey_pages(survey_id);
    create_survey_page(survey_id);
    get_survey_page(survey_id, page_id);
    update_survey_page(survey_id, page_id);
    delete_survey_page(survey_id, page_id);
    get_survey_page_questions(survey_id, page_id);
    create_survey_page_question(survey_id, page_id);
    get_survey_page_question(survey_id, page_id, question_id);
    update_survey_page_question(survey_id, page_id, question_id);
    delete_survey_page_question(survey_id, page_id, question_id);
    get_question_bank_questions();
    get_collectors(survey_id);
    create_collector(survey_id);
    get_collector(collector_id);
    update_collector(collector_id);
    delete_collector(collector_id);
    get_collector_messages(collector_id);
    create_collector_message(collector_id);
    get_collector_message(collector_id, message_id);
    send_collector_message(collector_id, message_id);
    get_collector_message_recipients(collector_id, message_id);
    add_collector_message_recipient(collector_id, message_id);
    get_collector_recipients(collector_id);
    get_contact_lists();
    create_contact_list();
    get_contact_list(contact_list_id);
    delete_contact_list(contact_list_id);
    get_contact_list_contacts(contact_list_id);
    get_contacts();
    create_contact();
    get_contact(contact_id);
    delete_contact(contact_id);
    get_contact_fields();
    get_survey_responses(survey_id);
    get_survey_responses_bulk(survey_id);
    get_survey_response(survey_id, response_id);
    get_survey_response_details(survey_id, response_id);
    delete_survey_response(survey_id, response_id);
    get_collector_responses(collector_id);
    get_collector_responses_bulk(collector_id);
    get_collector_response(collector_id, response_id);
    get_collector_response_details(collector_id, response_id);
    get_survey_rollups(survey_id);
    get_survey_page_rollups(survey_id, page_id);
    get_survey_question_rollups(survey_id, page_id, question_id);
    get_survey_trends(survey_id);
    get_webhooks();
    create_webhook();
    get_webhook(webhook_id);
    update_webhook(webhook_id);
    delete_webhook(webhook_id);
    get_benchmark_bundles();
    get_benchmark_bundle(bundle_id);
    get_errors();
    get_error(error_id);
}
