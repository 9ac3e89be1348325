//! HTTP plumbing shared by every adapter
//!
//! Builds the reqwest client, sends JSON requests and maps vendor error
//! statuses onto [`LlmError`] variants.

use crate::error::{Error, LlmError};
use reqwest::header::RETRY_AFTER;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Longest slice of a response body echoed back in error messages
const MAX_BODY_EXCERPT: usize = 300;

pub(crate) fn build_client(model: &str, timeout_secs: u64) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| {
            Error::Llm(LlmError::RequestFailed {
                model: model.to_string(),
                source: format!("Failed to build HTTP client: {}", error_chain(&e)),
            })
        })
}

/// Send a prepared request and decode a successful JSON body into `T`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    model: &str,
    request: RequestBuilder,
) -> Result<T, Error> {
    let response = request.send().await.map_err(|e| {
        let source = if e.is_timeout() {
            format!("Timeout: {}", error_chain(&e))
        } else {
            error_chain(&e)
        };
        Error::Llm(LlmError::RequestFailed {
            model: model.to_string(),
            source,
        })
    })?;

    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let body = response.text().await.map_err(|e| {
        Error::Llm(LlmError::RequestFailed {
            model: model.to_string(),
            source: format!("Failed to read response body: {}", error_chain(&e)),
        })
    })?;

    debug!("{} responded {} ({} bytes)", model, status, body.len());

    if !status.is_success() {
        return Err(classify_status(model, status, retry_after, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        Error::Llm(LlmError::InvalidResponse {
            model: model.to_string(),
            details: format!("Failed to parse JSON: {}. Body: {}", e, excerpt(&body)),
        })
    })
}

/// Map a non-2xx status onto an error variant
pub(crate) fn classify_status(
    model: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> Error {
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::AuthenticationFailed(model.to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded {
            model: model.to_string(),
            retry_after: retry_after.or_else(|| extract_retry_after(body)),
        },
        StatusCode::SERVICE_UNAVAILABLE => LlmError::ModelUnavailable(model.to_string()),
        _ => LlmError::RequestFailed {
            model: model.to_string(),
            source: format!("HTTP {}: {}", status, excerpt(body)),
        },
    };
    err.into()
}

/// Extract retry-after duration from an error body
fn extract_retry_after(body: &str) -> Option<u64> {
    // Patterns like "retry after 60 seconds" or "retry-after: 60"
    let re = regex::Regex::new(r"(?i)retry[- ]after:?\s*(\d+)").ok()?;
    re.captures(body)?.get(1)?.as_str().parse().ok()
}

/// Flatten an error and its sources into one line
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

fn excerpt(body: &str) -> String {
    body.trim().chars().take(MAX_BODY_EXCERPT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[test]
    fn test_classify_auth() {
        let err = classify_status("openai", StatusCode::UNAUTHORIZED, None, "bad key");
        assert!(matches!(err, Error::Llm(LlmError::AuthenticationFailed(_))));
        let err = classify_status("bedrock", StatusCode::FORBIDDEN, None, "");
        assert!(matches!(err, Error::Llm(LlmError::AuthenticationFailed(_))));
    }

    #[test]
    fn test_classify_rate_limit_prefers_header() {
        let err = classify_status(
            "openai",
            StatusCode::TOO_MANY_REQUESTS,
            Some(5),
            "retry after 60 seconds",
        );
        assert!(matches!(
            err,
            Error::Llm(LlmError::RateLimitExceeded { retry_after: Some(5), .. })
        ));
    }

    #[test]
    fn test_classify_rate_limit_from_body() {
        let err = classify_status("gemini", StatusCode::TOO_MANY_REQUESTS, None, "Retry-After: 120");
        assert!(matches!(
            err,
            Error::Llm(LlmError::RateLimitExceeded { retry_after: Some(120), .. })
        ));
    }

    #[test]
    fn test_classify_unavailable() {
        let err = classify_status("gemini", StatusCode::SERVICE_UNAVAILABLE, None, "");
        assert!(matches!(err, Error::Llm(LlmError::ModelUnavailable(_))));
    }

    #[test]
    fn test_classify_other_includes_status_and_body() {
        let err = classify_status("azure-openai", StatusCode::BAD_REQUEST, None, "{\"error\":\"nope\"}");
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("nope"));
    }

    #[test]
    fn test_extract_retry_after() {
        assert_eq!(extract_retry_after("retry after 60 seconds"), Some(60));
        assert_eq!(extract_retry_after("retry-after: 120"), Some(120));
        assert_eq!(extract_retry_after("no retry info"), None);
    }

    #[derive(Debug)]
    struct Outer(Inner);
    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "error sending request")
        }
    }
    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "dns error: no such host")
        }
    }
    impl std::error::Error for Inner {}
    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let chain = error_chain(&Outer(Inner));
        assert_eq!(chain, "error sending request: dns error: no such host");
    }
}
