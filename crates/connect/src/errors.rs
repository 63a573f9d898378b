//! Error types for lens API calls.

use serde_json::Value;
use thiserror::Error;

/// Coarse error category, used to pick log wording and the failure tag of a
/// [`FetchOutcome`](crate::graphql::FetchOutcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network failure or non-2xx HTTP status.
    Transport,
    /// The response carried a top-level `errors` array.
    GraphQl,
    /// The body was not valid JSON.
    Decode,
}

/// Errors that can occur while executing a GraphQL request.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be built (for example a header value with
    /// invalid characters).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure before a response was received.
    #[error("Request failed: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response carried GraphQL errors.
    #[error("GraphQL errors: {}", .messages.join("; "))]
    GraphQl {
        messages: Vec<String>,
        errors: Vec<Value>,
    },

    /// The body could not be decoded as JSON.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Build a GraphQL error from the raw `errors` array.
    pub fn graphql(errors: Vec<Value>) -> Self {
        let messages = errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect();
        FetchError::GraphQl { messages, errors }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::InvalidRequest(_)
            | FetchError::Network(_)
            | FetchError::HttpStatus { .. } => ErrorCategory::Transport,
            FetchError::GraphQl { .. } => ErrorCategory::GraphQl,
            FetchError::Decode(_) => ErrorCategory::Decode,
        }
    }
}

/// Errors from the login mutation.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login request failed: {0}")]
    Request(#[from] FetchError),

    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error("Login response did not contain an access token")]
    MissingToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graphql_error_collects_messages() {
        let error = FetchError::graphql(vec![
            json!({"message": "Not authorized", "path": ["node"]}),
            json!({"extensions": {"code": "INTERNAL"}}),
        ]);

        assert_eq!(error.category(), ErrorCategory::GraphQl);
        match &error {
            FetchError::GraphQl { messages, errors } => {
                assert_eq!(messages[0], "Not authorized");
                assert!(messages[1].contains("INTERNAL"));
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().starts_with("GraphQL errors: Not authorized; "));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            FetchError::HttpStatus {
                status: 401,
                body: "unauthorized".into()
            }
            .category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            FetchError::Network("connection refused".into()).category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            FetchError::Decode("expected value".into()).category(),
            ErrorCategory::Decode
        );
    }

    #[test]
    fn test_http_status_display() {
        let error = FetchError::HttpStatus {
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(error.to_string(), "HTTP 502: Bad Gateway");
    }
}
