//! Request assembly - everything that can fail before the network is touched

use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{HttpMethod, RequestSpec};

/// A validated request, ready for the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

pub fn default_headers() -> Vec<(String, String)> {
    vec![
        ("Accept".to_string(), "application/json".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ]
}

/// Parse the user's header block, a JSON object of name/value pairs
pub fn parse_headers(text: &str) -> Result<Vec<(String, String)>, AppError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Value =
        serde_json::from_str(text).map_err(|e| AppError::HeaderParse(e.to_string()))?;
    let Value::Object(map) = parsed else {
        return Err(AppError::HeaderParse("expected a JSON object".to_string()));
    };

    let mut headers = Vec::with_capacity(map.len());
    for (name, value) in map {
        let value = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| AppError::HeaderParse(format!("invalid header name '{}'", name)))?;
        HeaderValue::from_str(&value)
            .map_err(|_| AppError::HeaderParse(format!("invalid value for header '{}'", name)))?;
        headers.push((name, value));
    }
    Ok(headers)
}

/// Defaults first, user headers override them (names compare case-insensitively)
fn merge_headers(user: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut merged = default_headers();
    for (name, value) in user {
        match merged.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(existing) => *existing = (name, value),
            None => merged.push((name, value)),
        }
    }
    merged
}

/// Validate and assemble a request; no I/O happens here
pub fn prepare(spec: &RequestSpec) -> Result<PreparedRequest, AppError> {
    let url = spec.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("Please enter a valid API URL".to_string()));
    }

    let headers = merge_headers(parse_headers(&spec.headers)?);
    let body = if spec.method.carries_body() && !spec.body.trim().is_empty() {
        Some(spec.body.clone())
    } else {
        None
    };

    Ok(PreparedRequest {
        method: spec.method,
        url: url.to_string(),
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_is_validation_error() {
        let spec = RequestSpec::new(HttpMethod::GET, "");
        assert!(matches!(prepare(&spec), Err(AppError::Validation(_))));
        let spec = RequestSpec::new(HttpMethod::GET, "   ");
        assert!(matches!(prepare(&spec), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_malformed_headers_fail_before_sending() {
        let spec = RequestSpec::new(HttpMethod::POST, "https://api.example.com")
            .with_headers("{not valid json")
            .with_body("{}");
        assert!(matches!(prepare(&spec), Err(AppError::HeaderParse(_))));
    }

    #[test]
    fn test_non_object_headers_rejected() {
        assert!(matches!(parse_headers("[1, 2]"), Err(AppError::HeaderParse(_))));
        assert!(matches!(
            parse_headers(r#"{"Bad Name": "x"}"#),
            Err(AppError::HeaderParse(_))
        ));
    }

    #[test]
    fn test_user_headers_override_defaults() {
        let spec = RequestSpec::new(HttpMethod::GET, "https://api.example.com")
            .with_headers(r#"{"accept": "text/plain", "X-API-Key": "k", "X-Retry": 3}"#);
        let prepared = prepare(&spec).unwrap();

        assert_eq!(prepared.headers.len(), 4);
        assert!(prepared.headers.contains(&("accept".into(), "text/plain".into())));
        assert!(prepared.headers.contains(&("Content-Type".into(), "application/json".into())));
        assert!(prepared.headers.contains(&("X-API-Key".into(), "k".into())));
        assert!(prepared.headers.contains(&("X-Retry".into(), "3".into())));
        assert!(!prepared.headers.iter().any(|(n, _)| n == "Accept"));
    }

    #[test]
    fn test_body_only_for_non_get() {
        let get = RequestSpec::new(HttpMethod::GET, "https://a.io").with_body(r#"{"a":1}"#);
        assert_eq!(prepare(&get).unwrap().body, None);

        let delete = RequestSpec::new(HttpMethod::DELETE, "https://a.io").with_body(r#"{"a":1}"#);
        assert_eq!(prepare(&delete).unwrap().body.as_deref(), Some(r#"{"a":1}"#));

        let blank = RequestSpec::new(HttpMethod::POST, "https://a.io").with_body("  \n");
        assert_eq!(prepare(&blank).unwrap().body, None);
    }

    #[test]
    fn test_url_is_trimmed() {
        let spec = RequestSpec::new(HttpMethod::GET, "  https://a.io/x  ");
        assert_eq!(prepare(&spec).unwrap().url, "https://a.io/x");
    }
}
