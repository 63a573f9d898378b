//! Service-account authentication for the Google APIs.
//!
//! The key file's private key signs an RS256 JWT, which the token endpoint
//! exchanges for a short-lived bearer token. Tokens are cached until shortly
//! before they expire.

use std::fmt;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::errors::{Result, SheetsError};

/// OAuth scopes needed to open, create and edit spreadsheets.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for the Google APIs.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// The fields of a service-account key file that we use.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SheetsError::Credentials(format!(
                "{} does not exist",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| SheetsError::Credentials(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| SheetsError::Credentials(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges signed service-account assertions for access tokens.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::Credentials(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(ServiceAccountKey::from_file(path)?)
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Signed JWT assertion valid for one hour from `now`.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: SCOPES.join(" "),
            aud: self.key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SheetsError::Token(format!("Failed to sign assertion: {}", e)))
    }

    async fn exchange(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        debug!("Requesting access token for {}", self.key.client_email);
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetsError::Token(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SheetsError::Token(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(SheetsError::Token(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::Token(format!("Failed to parse response: {}", e)))?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(lifetime - EXPIRY_MARGIN_SECS),
        })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Utc::now()) {
            return Ok(token.value.clone());
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}

/// A fixed token, for callers that already hold one.
#[derive(Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde_json::json;

    const KEY_FILE: &str = include_str!("../tests/fixtures/service_account.json");
    const PUBLIC_KEY: &str = include_str!("../tests/fixtures/test_key.pub.pem");

    fn key_with_token_uri(token_uri: &str) -> ServiceAccountKey {
        ServiceAccountKey {
            token_uri: token_uri.to_string(),
            ..ServiceAccountKey::from_json(KEY_FILE).unwrap()
        }
    }

    #[test]
    fn test_missing_key_file() {
        let err = ServiceAccountKey::from_file(Path::new("/nonexistent/credentials.json")).unwrap_err();
        assert!(matches!(err, SheetsError::Credentials(_)));
    }

    #[test]
    fn test_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, KEY_FILE).unwrap();

        let auth = ServiceAccountAuth::from_file(&path).unwrap();

        assert_eq!(auth.client_email(), "lotsync@lotsync-test.iam.gserviceaccount.com");
    }

    #[test]
    fn test_invalid_private_key() {
        let key = ServiceAccountKey {
            private_key: "not a key".into(),
            ..ServiceAccountKey::from_json(KEY_FILE).unwrap()
        };
        assert!(matches!(
            ServiceAccountAuth::new(key),
            Err(SheetsError::Credentials(_))
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key = ServiceAccountKey::from_json(KEY_FILE).unwrap();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("BEGIN PRIVATE KEY"));
        assert!(rendered.contains("lotsync@lotsync-test.iam.gserviceaccount.com"));
    }

    #[test]
    fn test_sign_assertion_claims() {
        let auth = ServiceAccountAuth::new(ServiceAccountKey::from_json(KEY_FILE).unwrap()).unwrap();
        let now = Utc::now();

        let jwt = auth.sign_assertion(now).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let decoded = decode::<Claims>(
            &jwt,
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.header.kid.as_deref(), Some("test-key-id"));
        assert_eq!(decoded.claims.iss, auth.client_email());
        assert_eq!(
            decoded.claims.scope,
            "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive"
        );
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_token_exchange_is_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .header("content-type", "application/x-www-form-urlencoded");
                then.status(200).json_body(json!({
                    "access_token": "ya29.test",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                }));
            })
            .await;

        let auth = ServiceAccountAuth::new(key_with_token_uri(&server.url("/token"))).unwrap();

        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_token_exchange_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(400)
                    .json_body(json!({"error": "invalid_grant", "error_description": "Invalid JWT Signature."}));
            })
            .await;

        let auth = ServiceAccountAuth::new(key_with_token_uri(&server.url("/token"))).unwrap();
        let err = auth.access_token().await.unwrap_err();

        assert!(matches!(err, SheetsError::Token(ref m) if m.contains("invalid_grant")));
    }
}
