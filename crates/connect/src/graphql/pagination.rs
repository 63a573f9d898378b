//! Cursor-based pagination over GraphQL connections.
//!
//! A connection looks like `{pageInfo: {hasNextPage, endCursor}, edges:
//! [{node: {...}}]}`. [`fetch_all`] follows `endCursor` until the server
//! reports no further page and flattens every node into a record.

use log::{debug, info, warn};
use serde_json::Value;

use lotsync_core::utils::Lookup;

use super::query::{QueryDescriptor, ResultPath};
use super::transport::GraphQlTransport;
use crate::errors::{ErrorCategory, FetchError};

/// Result of a paginated fetch.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// At least one record was fetched. May be partial if a later page failed.
    Ok(T),
    /// The query succeeded but produced no records.
    Empty,
    /// The first request failed at the network or HTTP level.
    TransportFailure(FetchError),
    /// The server returned GraphQL errors, or a body that was not JSON.
    ProtocolFailure(FetchError),
}

impl<T> FetchOutcome<T> {
    pub fn from_error(error: FetchError) -> Self {
        match error.category() {
            ErrorCategory::Transport => FetchOutcome::TransportFailure(error),
            ErrorCategory::GraphQl | ErrorCategory::Decode => FetchOutcome::ProtocolFailure(error),
        }
    }

    pub fn map<U, F>(self, f: F) -> FetchOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            FetchOutcome::Ok(value) => FetchOutcome::Ok(f(value)),
            FetchOutcome::Empty => FetchOutcome::Empty,
            FetchOutcome::TransportFailure(e) => FetchOutcome::TransportFailure(e),
            FetchOutcome::ProtocolFailure(e) => FetchOutcome::ProtocolFailure(e),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FetchOutcome::TransportFailure(_) | FetchOutcome::ProtocolFailure(_)
        )
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchOutcome::TransportFailure(e) | FetchOutcome::ProtocolFailure(e) => Some(e),
            _ => None,
        }
    }

    /// `Some(value)` on success, `Some(empty)` when empty, `None` on failure.
    pub fn into_option(self, empty: impl FnOnce() -> T) -> Option<T> {
        match self {
            FetchOutcome::Ok(value) => Some(value),
            FetchOutcome::Empty => Some(empty()),
            FetchOutcome::TransportFailure(_) | FetchOutcome::ProtocolFailure(_) => None,
        }
    }
}

/// One page of a connection, borrowed from the response body.
#[derive(Debug)]
pub struct Page<'a> {
    /// Edge nodes in server order. Edges without a node are skipped.
    pub nodes: Vec<&'a Value>,
    pub has_next_page: bool,
    pub end_cursor: Option<&'a str>,
}

impl<'a> Page<'a> {
    pub fn from_connection(connection: Lookup<'a>) -> Self {
        let nodes = connection
            .get("edges")
            .as_array()
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|edge| Lookup::new(edge).get("node").value())
                    .collect()
            })
            .unwrap_or_default();
        let page_info = connection.get("pageInfo");

        Self {
            nodes,
            has_next_page: page_info.get("hasNextPage").as_bool().unwrap_or(false),
            end_cursor: page_info.get("endCursor").as_str().filter(|c| !c.is_empty()),
        }
    }
}

/// Top-level `errors` array of a GraphQL response. An empty array still
/// counts as an error response.
pub fn graphql_errors(body: &Value) -> Option<Vec<Value>> {
    body.get("errors").and_then(Value::as_array).cloned()
}

/// Fetch every page of a connection and flatten its nodes.
///
/// - A failed first request yields a failure outcome and no data.
/// - GraphQL `errors` on any page yield a protocol failure; records already
///   collected are discarded.
/// - A missing connection on the first page yields [`FetchOutcome::Empty`].
/// - A transport or decode failure, or a missing connection, on a later page
///   stops pagination and keeps the records collected so far.
/// - `hasNextPage: true` without an `endCursor` stops pagination.
///
/// There is no page limit and no retry.
pub async fn fetch_all<R, F>(
    transport: &dyn GraphQlTransport,
    query: &QueryDescriptor,
    result_path: &ResultPath,
    mut node_to_record: F,
) -> FetchOutcome<Vec<R>>
where
    F: FnMut(&Value) -> R,
{
    let operation = query.operation_name();
    let mut request = query.clone();
    let mut records: Vec<R> = Vec::new();
    let mut page_number: usize = 0;

    loop {
        page_number += 1;
        let first_page = page_number == 1;

        let body = match transport.execute(&request).await {
            Ok(body) => body,
            Err(err) if first_page => return FetchOutcome::from_error(err),
            Err(err) => {
                warn!(
                    "[{}] Page {} failed, keeping {} records already fetched: {}",
                    operation,
                    page_number,
                    records.len(),
                    err
                );
                break;
            }
        };

        if let Some(errors) = graphql_errors(&body) {
            return FetchOutcome::ProtocolFailure(FetchError::graphql(errors));
        }

        let connection = Lookup::new(&body).path(result_path.segments());
        if connection.is_missing() {
            if first_page {
                debug!("[{}] No data at {}", operation, result_path);
                return FetchOutcome::Empty;
            }
            warn!(
                "[{}] Page {} has no data at {}, keeping {} records",
                operation,
                page_number,
                result_path,
                records.len()
            );
            break;
        }

        let page = Page::from_connection(connection);
        debug!(
            "[{}] Page {}: {} nodes, hasNextPage={}",
            operation,
            page_number,
            page.nodes.len(),
            page.has_next_page
        );
        records.extend(page.nodes.iter().copied().map(&mut node_to_record));

        if !page.has_next_page {
            break;
        }
        let Some(cursor) = page.end_cursor else {
            warn!(
                "[{}] Page {} reports hasNextPage without endCursor, stopping",
                operation, page_number
            );
            break;
        };
        request = request.with_cursor(cursor);
    }

    info!(
        "[{}] Fetched {} records in {} page(s)",
        operation,
        records.len(),
        page_number
    );

    if records.is_empty() {
        FetchOutcome::Empty
    } else {
        FetchOutcome::Ok(records)
    }
}
