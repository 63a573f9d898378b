//! Login through the `Authenticate` mutation.

use std::fmt;

use log::info;
use serde_json::json;

use lotsync_core::utils::Lookup;

use crate::errors::{AuthError, FetchError};
use crate::graphql::{graphql_errors, GraphQlTransport, QueryDescriptor};

pub const AUTHENTICATE_OPERATION: &str = "Authenticate";

const AUTHENTICATE_MUTATION: &str = r#"mutation Authenticate($input: AuthenticateInput!) {
  authenticate(input: $input) {
    didSucceed
    error
    outcome {
      accessToken
      refreshToken
      viewer {
        user {
          id
          correlationKey
          __typename
        }
        __typename
      }
      __typename
    }
    __typename
  }
}"#;

/// Login credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub mfa_audience: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mfa_audience", &self.mfa_audience)
            .finish()
    }
}

/// Tokens returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
    refresh_token: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

pub fn authenticate_query(credentials: &Credentials) -> QueryDescriptor {
    QueryDescriptor::new(AUTHENTICATE_OPERATION, AUTHENTICATE_MUTATION).with_variable(
        "input",
        json!({
            "mfaAudience": credentials.mfa_audience,
            "password": credentials.password,
            "username": credentials.username,
        }),
    )
}

/// Log in and return the session tokens.
///
/// The token is not refreshed later; a run that outlives it fails with
/// HTTP errors from the API.
pub async fn authenticate(
    transport: &dyn GraphQlTransport,
    credentials: &Credentials,
) -> Result<Session, AuthError> {
    let body = transport.execute(&authenticate_query(credentials)).await?;

    if let Some(errors) = graphql_errors(&body) {
        return Err(AuthError::Request(FetchError::graphql(errors)));
    }

    let result = Lookup::new(&body).path(["data", "authenticate"]);
    if result.is_missing() {
        return Err(AuthError::Request(FetchError::Decode(
            "Response has no data.authenticate".to_string(),
        )));
    }

    if result.get("didSucceed").as_bool() != Some(true) {
        let reason = result
            .get("error")
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        return Err(AuthError::Rejected(reason));
    }

    let outcome = result.get("outcome");
    let access_token = outcome
        .get("accessToken")
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;
    let refresh_token = outcome
        .get("refreshToken")
        .as_str()
        .map(str::to_string);

    info!("Logged in as {}", credentials.username);
    Ok(Session::new(access_token, refresh_token))
}
