//! GraphQL request descriptors and result paths.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Name of the cursor variable.
pub const CURSOR_VARIABLE: &str = "after";
/// Name of the page-size variable.
pub const PAGE_SIZE_VARIABLE: &str = "first";

/// A GraphQL operation with its variables.
///
/// Serializes to the wire body `{operationName, query, variables}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    operation_name: String,
    query: String,
    variables: Map<String, Value>,
}

impl QueryDescriptor {
    pub fn new(operation_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            query: query.into(),
            variables: Map::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set the `first` variable.
    pub fn with_page_size(self, first: u32) -> Self {
        self.with_variable(PAGE_SIZE_VARIABLE, first)
    }

    /// Copy of this descriptor with the `after` cursor set.
    pub fn with_cursor(&self, cursor: &str) -> Self {
        self.clone().with_variable(CURSOR_VARIABLE, cursor)
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    pub fn cursor(&self) -> Option<&str> {
        self.variables.get(CURSOR_VARIABLE).and_then(Value::as_str)
    }

    pub fn page_size(&self) -> Option<u64> {
        self.variables.get(PAGE_SIZE_VARIABLE).and_then(Value::as_u64)
    }
}

/// Keys locating the paginated connection inside a response body,
/// e.g. `data.node.taxLots`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPath(Vec<String>);

impl ResultPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path.
    pub fn parse(dotted: &str) -> Self {
        Self::new(dotted.split('.').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ResultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_body() {
        let query = QueryDescriptor::new("AccountTaxLots", "query AccountTaxLots { __typename }")
            .with_variable("id", "acct-1")
            .with_page_size(2000);

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            json!({
                "operationName": "AccountTaxLots",
                "query": "query AccountTaxLots { __typename }",
                "variables": {"id": "acct-1", "first": 2000}
            })
        );
        assert_eq!(query.cursor(), None);
        assert_eq!(query.page_size(), Some(2000));
    }

    #[test]
    fn test_with_cursor_leaves_original_untouched() {
        let query = QueryDescriptor::new("Op", "query Op { x }").with_page_size(2);
        let next = query.with_cursor("c1");

        assert_eq!(next.cursor(), Some("c1"));
        assert_eq!(query.cursor(), None);
        assert_eq!(next.with_cursor("c2").cursor(), Some("c2"));
    }

    #[test]
    fn test_result_path_parse_and_display() {
        let path = ResultPath::parse("data.account.balance.investments.positions");
        assert_eq!(path.segments().len(), 5);
        assert_eq!(path.to_string(), "data.account.balance.investments.positions");
        assert_eq!(path, ResultPath::new(["data", "account", "balance", "investments", "positions"]));
    }
}
