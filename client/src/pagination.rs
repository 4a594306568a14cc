//! Response envelopes and page walking for list endpoints.
//!
//! SurveyMonkey list endpoints answer with
//! `{"data": [...], "page": 1, "per_page": 50, "links": {"next": "..."}}`.

use serde_json::Value;

use crate::{
    client::SurveyMontyClient,
    error::{ApiError, SurveyMontyError},
    request::RequestOptions,
};

/// The `data` member of a response envelope.
pub fn data_of(payload: &Value) -> Result<&Value, SurveyMontyError> {
    payload
        .get("data")
        .ok_or_else(|| ApiError::MissingData(payload.clone()).into())
}

/// Whether the envelope links to a following page.
pub fn has_next_page(payload: &Value) -> bool {
    payload
        .pointer("/links/next")
        .and_then(Value::as_str)
        .is_some_and(|next| !next.is_empty())
}

impl SurveyMontyClient {
    /// Calls a list endpoint page by page and concatenates every `data` array.
    ///
    /// Starts at the `page` query parameter of `options`, or 1, and stops when
    /// the envelope has no `links.next` or after the configured `max_pages`.
    pub fn call_all_pages(
        &self,
        name: &str,
        args: &[&str],
        options: RequestOptions,
    ) -> Result<Vec<Value>, SurveyMontyError> {
        let mut page = options
            .query_value("page")
            .and_then(|p| p.parse::<u64>().ok())
            .unwrap_or(1);
        let mut items = Vec::new();

        for fetched in 1..=self.max_pages() {
            let mut page_options = options.clone();
            page_options.set_query("page", page);

            let payload = self.call(name, args, page_options)?;
            let data = data_of(&payload)?.as_array().cloned();
            match data {
                Some(data) => items.extend(data),
                None => return Err(ApiError::MissingData(payload).into()),
            }

            if !has_next_page(&payload) {
                return Ok(items);
            }
            if fetched == self.max_pages() {
                log::warn!("{name}: stopping after {fetched} pages");
            }
            page += 1;
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_of() {
        let payload = json!({"data": [{"id": "1"}], "page": 1});
        assert_eq!(data_of(&payload).unwrap()[0]["id"], "1");

        let err = data_of(&json!({"error": {"id": "1020"}})).unwrap_err();
        assert!(err.is_api_error());
    }

    #[test]
    fn test_has_next_page() {
        assert!(has_next_page(&json!({"links": {"next": "https://x/surveys?page=2"}})));
        assert!(!has_next_page(&json!({"links": {"self": "https://x/surveys?page=1"}})));
        assert!(!has_next_page(&json!({"links": {"next": ""}})));
        assert!(!has_next_page(&json!({"data": []})));
    }
}
