//! GraphQL plumbing shared by every lens API fetcher.

mod pagination;
mod query;
mod transport;


pub use pagination::{fetch_all, graphql_errors, FetchOutcome, Page};
pub use query::{QueryDescriptor, ResultPath, CURSOR_VARIABLE, PAGE_SIZE_VARIABLE};
pub use transport::GraphQlTransport;
