//! HTTP client for the brokerage lens GraphQL API.
//!
//! Every request mimics the web dashboard: same origin, client id and
//! segment id, plus a millisecond sentinel. Once a [`Session`] exists the
//! bearer token is attached as well.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE,
    ORIGIN, REFERER,
};
use serde_json::Value;

use crate::auth::Session;
use crate::errors::FetchError;
use crate::graphql::{GraphQlTransport, QueryDescriptor};

/// Default endpoint of the lens GraphQL API.
pub const DEFAULT_LENS_API_URL: &str = "https://lens.m1.com/graphql";

/// Dashboard origin the API expects requests to come from.
pub const DASHBOARD_ORIGIN: &str = "https://dashboard.m1.com";

/// Web client identifier sent as `x-client-id`.
pub const WEB_CLIENT_ID: &str = "m1-web/10.0.170";

const X_CLIENT_ID: &str = "x-client-id";
const X_CLIENT_SENTINEL: &str = "x-client-sentinel";
const X_SEGMENT_ID: &str = "x-segment-id";
const X_APOLLO_OPERATION_NAME: &str = "x-apollo-operation-name";

/// Maximum number of body characters kept in error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// GraphQL client for the lens API.
///
/// ```ignore
/// let client = LensApiClient::new(DEFAULT_LENS_API_URL, "segment-id")?;
/// let session = authenticate(&client, &credentials).await?;
/// let client = client.with_session(&session);
/// ```
#[derive(Clone)]
pub struct LensApiClient {
    client: reqwest::Client,
    url: String,
    segment_id: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for LensApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LensApiClient")
            .field("url", &self.url)
            .field("segment_id", &self.segment_id)
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

impl LensApiClient {
    /// Create an unauthenticated client.
    ///
    /// No request timeout is set; the HTTP client default applies.
    pub fn new(url: &str, segment_id: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            FetchError::InvalidRequest(format!("Failed to initialize HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            segment_id: segment_id.to_string(),
            access_token: None,
        })
    }

    /// Copy of this client that sends the session's bearer token.
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token().to_string()),
            ..self.clone()
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Headers for one request of `operation_name`.
    fn headers(&self, operation_name: &str) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(REFERER, HeaderValue::from_static("https://dashboard.m1.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static(DASHBOARD_ORIGIN));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(X_CLIENT_ID, HeaderValue::from_static(WEB_CLIENT_ID));
        headers.insert(
            X_CLIENT_SENTINEL,
            HeaderValue::from(chrono::Utc::now().timestamp_millis()),
        );
        headers.insert(X_SEGMENT_ID, header_value(X_SEGMENT_ID, &self.segment_id)?);
        headers.insert(
            X_APOLLO_OPERATION_NAME,
            header_value(X_APOLLO_OPERATION_NAME, operation_name)?,
        );

        if let Some(token) = &self.access_token {
            let mut value = header_value("authorization", &format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// POST a GraphQL request and return the decoded JSON body.
    pub async fn post(&self, query: &QueryDescriptor) -> Result<Value, FetchError> {
        debug!(
            "[LensApi] POST {} operation={} cursor={:?}",
            self.url,
            query.operation_name(),
            query.cursor()
        );

        let response = self
            .client
            .post(&self.url)
            .headers(self.headers(query.operation_name())?)
            .json(query)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        parse_response(response).await
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value)
        .map_err(|e| FetchError::InvalidRequest(format!("Invalid {} header: {}", name, e)))
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

/// Map a response to its JSON body, a status error, or a decode error.
async fn parse_response(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Network(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            body: preview(&body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| FetchError::Decode(format!("{} - {}", e, preview(&body))))
}

#[async_trait]
impl GraphQlTransport for LensApiClient {
    async fn execute(&self, query: &QueryDescriptor) -> Result<Value, FetchError> {
        self.post(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_url_normalization() {
        let client = LensApiClient::new("https://lens.m1.com/graphql/", "seg").unwrap();
        assert_eq!(client.url(), DEFAULT_LENS_API_URL);
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_headers_without_session() {
        let client = LensApiClient::new(DEFAULT_LENS_API_URL, "seg-1").unwrap();
        let headers = client.headers("AccountTaxLots").unwrap();

        assert_eq!(headers["x-apollo-operation-name"], "AccountTaxLots");
        assert_eq!(headers["x-segment-id"], "seg-1");
        assert_eq!(headers["x-client-id"], WEB_CLIENT_ID);
        assert_eq!(headers[ORIGIN], DASHBOARD_ORIGIN);
        assert!(headers.get(AUTHORIZATION).is_none());
        let sentinel: i64 = headers["x-client-sentinel"].to_str().unwrap().parse().unwrap();
        assert!(sentinel > 0);
    }

    #[test]
    fn test_headers_with_session() {
        let client = LensApiClient::new(DEFAULT_LENS_API_URL, "seg-1")
            .unwrap()
            .with_session(&Session::new("tok-123", None));
        let headers = client.headers("InvestmentsTablePagination").unwrap();

        assert!(client.is_authenticated());
        assert_eq!(headers[AUTHORIZATION], "Bearer tok-123");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_invalid_segment_id_is_rejected() {
        let client = LensApiClient::new(DEFAULT_LENS_API_URL, "bad\nvalue").unwrap();
        let err = client.headers("Authenticate").unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = LensApiClient::new(DEFAULT_LENS_API_URL, "seg")
            .unwrap()
            .with_session(&Session::new("secret-token", None));
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("authenticated: true"));
    }
}
