use async_trait::async_trait;
use serde_json::Value;

use super::query::QueryDescriptor;
use crate::errors::FetchError;

/// An HTTP client able to POST a GraphQL request.
///
/// Implementations return the parsed JSON body of a 2xx response, a
/// transport error for network failures and non-2xx statuses, or a decode
/// error when the body is not JSON. GraphQL-level `errors` are left in the
/// body for the caller to inspect.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn execute(&self, query: &QueryDescriptor) -> Result<Value, FetchError>;
}
