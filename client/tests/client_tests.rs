use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    thread,
};

use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode,
};
use serde_json::json;
use surveymonty::{
    endpoints::{make_full_endpoint, make_url, parse_path_params},
    load_version_config, ApiError, ClientConfig, EndpointSpec, HttpTransport, RequestOptions,
    SurveyMontyClient, SurveyMontyError, TransportRequest, TransportResponse, VersionConfig,
};

const TOKEN: &str = "stub_access_token";

/// Records every request and answers from a queue, `{}` once it runs dry.
#[derive(Default)]
struct MockTransport {
    requests: Mutex<Vec<TransportRequest>>,
    responses: Mutex<VecDeque<TransportResponse>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_responses(responses: Vec<TransportResponse>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        })
    }

    fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, SurveyMontyError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| TransportResponse::new(StatusCode::OK, "{}")))
    }
}

fn ok(body: serde_json::Value) -> TransportResponse {
    TransportResponse::new(StatusCode::OK, body.to_string())
}

fn v3_client(transport: Arc<MockTransport>) -> SurveyMontyClient {
    SurveyMontyClient::with_transport(ClientConfig::new(TOKEN), transport).unwrap()
}

fn client_for(specs: Vec<EndpointSpec>, transport: Arc<MockTransport>) -> SurveyMontyClient {
    let config = ClientConfig::new(TOKEN).with_host("https://api.example.com/");
    SurveyMontyClient::with_endpoints(config, &VersionConfig { endpoints: specs }, transport).unwrap()
}

#[test]
fn test_every_v3_endpoint_issues_one_request() {
    let config = load_version_config("v3").unwrap();
    for spec in &config.endpoints {
        let transport = MockTransport::new();
        let client = v3_client(transport.clone());

        let names = parse_path_params(&spec.endpoint);
        let args: Vec<&str> = names.iter().map(String::as_str).collect();
        client.call(&spec.name, &args, RequestOptions::new()).unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "{}", spec.name);
        let request = &requests[0];
        let endpoint = make_full_endpoint(&spec.endpoint, &names, &args).unwrap();
        assert_eq!(request.url, make_url("https://api.surveymonkey.net", "v3", &endpoint));
        assert_eq!(request.method, spec.http_method().unwrap());
        assert_eq!(request.headers[AUTHORIZATION], format!("Bearer {TOKEN}").as_str());
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
    }
}

#[test]
fn test_missing_path_argument_never_reaches_transport() {
    let transport = MockTransport::new();
    let client = client_for(
        vec![EndpointSpec::new("getSurvey", "/surveys/{survey_id}", "GET")],
        transport.clone(),
    );

    let err = client.call("getSurvey", &[], RequestOptions::new()).unwrap_err();
    assert!(err.is_argument_error());
    assert_eq!(err.to_string(), "getSurvey expects 1 arg(s) but received 0");
    assert!(transport.requests().is_empty());
}

#[test]
fn test_two_path_arguments_fill_template_in_order() {
    let transport = MockTransport::new();
    let client = client_for(
        vec![EndpointSpec::new(
            "getDetail",
            "/surveys/{survey_id}/details/{detail_id}",
            "GET",
        )],
        transport.clone(),
    );

    client
        .call("getDetail", &["123", "456"], RequestOptions::new())
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.ends_with("/surveys/123/details/456"));
    assert_eq!(requests[0].url, "https://api.example.com/v3/surveys/123/details/456");
}

#[test]
fn test_client_exposes_configured_function() {
    let client = client_for(
        vec![EndpointSpec::new("getSurvey", "/surveys/{id}", "GET")],
        MockTransport::new(),
    );

    let function = client.function("getSurvey").unwrap();
    assert_eq!(function.name(), "getSurvey");
    assert_eq!(function.arity(), 1);
    assert_eq!(function.method(), &Method::GET);
    assert_eq!(client.functions().count(), 1);
    assert!(client.function("get_survey").is_none());
}

#[test]
fn test_unknown_function() {
    let client = client_for(vec![], MockTransport::new());
    let err = client.call("nope", &[], RequestOptions::new()).unwrap_err();
    assert!(matches!(err, SurveyMontyError::UnknownFunction(ref name) if name == "nope"));
}

#[test]
fn test_http_failure_carries_body() {
    let body = r#"{"error": {"id": "1014", "message": "Permission error"}}"#;
    let transport = MockTransport::with_responses(vec![TransportResponse::new(
        StatusCode::FORBIDDEN,
        body,
    )]);
    let client = v3_client(transport.clone());

    let err = client.get_me(RequestOptions::new()).unwrap_err();
    match err {
        SurveyMontyError::Api(ApiError::Http { status, body: got }) => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(got, body);
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn test_unparsable_body_is_no_json_payload() {
    let transport =
        MockTransport::with_responses(vec![TransportResponse::new(StatusCode::OK, "<html>")]);
    let client = v3_client(transport);

    let err = client.get_survey("1", RequestOptions::new()).unwrap_err();
    assert!(err.is_api_error());
    assert_eq!(
        err.to_string(),
        "unexpected SurveyMonkey API response, no JSON payload"
    );
}

#[test]
fn test_payload_returned_unmodified() {
    let payload = json!({"id": "42", "title": "Feedback", "nested": {"a": [1, 2]}});
    let transport = MockTransport::with_responses(vec![ok(payload.clone())]);
    let client = v3_client(transport);

    assert_eq!(client.get_survey("42", RequestOptions::new()).unwrap(), payload);
}

#[test]
fn test_options_pass_through() {
    let transport = MockTransport::new();
    let client = v3_client(transport.clone());

    let options = RequestOptions::new()
        .header("Authorization", "Bearer intruder")
        .unwrap()
        .header("X-Request-Id", "r-1")
        .unwrap()
        .query("per_page", 100)
        .body(json!({"title": "New survey"}));
    client.create_survey(options).unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url, "https://api.surveymonkey.net/v3/surveys");
    assert_eq!(request.headers[AUTHORIZATION], "Bearer stub_access_token");
    assert_eq!(request.headers["x-request-id"], "r-1");
    assert_eq!(request.query, vec![("per_page".to_string(), "100".to_string())]);
    assert_eq!(request.body, Some(json!({"title": "New survey"})));
}

#[test]
fn test_calls_are_independent() {
    let transport = MockTransport::with_responses(vec![
        TransportResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
        ok(json!({"id": "me"})),
    ]);
    let client = v3_client(transport);

    assert!(client.get_me(RequestOptions::new()).is_err());
    assert_eq!(client.get_me(RequestOptions::new()).unwrap()["id"], "me");
}

#[test]
fn test_call_all_pages_follows_next_links() {
    let transport = MockTransport::with_responses(vec![
        ok(json!({"data": [{"id": "1"}, {"id": "2"}], "page": 1,
                  "links": {"next": "https://api.surveymonkey.net/v3/surveys?page=2"}})),
        ok(json!({"data": [{"id": "3"}], "page": 2, "links": {}})),
    ]);
    let client = v3_client(transport.clone());

    let surveys = client
        .call_all_pages("get_surveys", &[], RequestOptions::new().query("per_page", 2))
        .unwrap();
    let ids: Vec<_> = surveys.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["1", "2", "3"]);

    let pages: Vec<_> = transport
        .requests()
        .iter()
        .map(|r| {
            r.query
                .iter()
                .find(|(k, _)| k == "page")
                .map(|(_, v)| v.clone())
                .unwrap()
        })
        .collect();
    assert_eq!(pages, ["1", "2"]);
}

#[test]
fn test_call_all_pages_respects_max_pages() {
    let next = json!({"data": [0], "links": {"next": "more"}});
    let transport = MockTransport::with_responses(vec![ok(next.clone()), ok(next.clone()), ok(next)]);
    let mut config = ClientConfig::new(TOKEN);
    config.max_pages = 2;
    let client = SurveyMontyClient::with_transport(config, transport.clone()).unwrap();

    let items = client
        .call_all_pages("get_surveys", &[], RequestOptions::new())
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn test_call_all_pages_without_data_fails() {
    let transport = MockTransport::with_responses(vec![ok(json!({"id": "me"}))]);
    let client = v3_client(transport);
    let err = client
        .call_all_pages("get_surveys", &[], RequestOptions::new())
        .unwrap_err();
    assert!(matches!(err, SurveyMontyError::Api(ApiError::MissingData(_))));
}

#[test]
fn test_decode_retry_from_config() {
    let transport = MockTransport::with_responses(vec![
        TransportResponse::new(StatusCode::OK, ""),
        ok(json!({"id": "me"})),
    ]);
    let config = ClientConfig::new(TOKEN).with_decode_retries(1, std::time::Duration::ZERO);
    let client = SurveyMontyClient::with_transport(config, transport.clone()).unwrap();

    assert_eq!(client.get_me(RequestOptions::new()).unwrap()["id"], "me");
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn test_invalid_configuration_is_config_error() {
    let err = SurveyMontyClient::with_transport(ClientConfig::new(TOKEN).with_version("v9"), MockTransport::new())
        .unwrap_err();
    assert!(err.is_config_error());

    let err = SurveyMontyClient::with_transport(ClientConfig::new(""), MockTransport::new()).unwrap_err();
    assert!(err.is_config_error());

    let duplicate = VersionConfig {
        endpoints: vec![
            EndpointSpec::new("a", "/a", "GET"),
            EndpointSpec::new("a", "/b", "GET"),
        ],
    };
    let err = SurveyMontyClient::with_endpoints(ClientConfig::new(TOKEN), &duplicate, MockTransport::new())
        .unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn test_client_shared_across_threads() {
    let transport = MockTransport::new();
    let client = Arc::new(v3_client(transport.clone()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                let id = i.to_string();
                client.get_survey(&id, RequestOptions::new()).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
    urls.sort();
    assert_eq!(
        urls,
        (0..4)
            .map(|i| format!("https://api.surveymonkey.net/v3/surveys/{i}"))
            .collect::<Vec<_>>()
    );
}
