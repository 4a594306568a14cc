//! URL templates of the form `/surveys/{survey_id}/details`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SurveyMontyError;

static PATH_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("path parameter pattern is valid"));

/// Returns every `{name}` placeholder of `template`, left to right.
///
/// Repeated placeholders are returned once per occurrence, so the result
/// lines up with positional call arguments.
pub fn parse_path_params(template: &str) -> Vec<String> {
    PATH_PARAM_REGEX
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Interpolates `values` into `template`, binding `values[i]` to `param_names[i]`.
///
/// # Errors
///
/// Returns [`SurveyMontyError::Format`] if a placeholder in the template has
/// no bound value.
pub fn make_full_endpoint<S: AsRef<str>>(
    template: &str,
    param_names: &[String],
    values: &[S],
) -> Result<String, SurveyMontyError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for (index, caps) in PATH_PARAM_REGEX.captures_iter(template).enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let name = &caps[1];
        // i-th placeholder takes the i-th value; fall back to a name lookup
        // when the caller's names are not in template order
        let slot = match param_names.get(index) {
            Some(p) if p == name => Some(index),
            _ => param_names.iter().position(|p| p == name),
        };
        let value = slot
            .and_then(|i| values.get(i))
            .ok_or_else(|| SurveyMontyError::Format {
                placeholder: name.to_string(),
            })?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value.as_ref());
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Strips leading and trailing `/` from a URL fragment.
pub fn clean_url_fragment(fragment: &str) -> &str {
    fragment.trim_matches('/')
}

/// Joins host, version and endpoint with exactly one `/` between each.
pub fn make_url(host: &str, version: &str, endpoint: &str) -> String {
    format!(
        "{}/{}/{}",
        clean_url_fragment(host),
        clean_url_fragment(version),
        clean_url_fragment(endpoint)
    )
}
