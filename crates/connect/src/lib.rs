//! lotsync connect - login and paginated fetchers for the brokerage lens API.
//!
//! [`LensApiClient`] speaks GraphQL over HTTPS, [`authenticate`] turns
//! credentials into a [`Session`], and [`PortfolioFetcher`] walks the
//! tax-lot and holdings connections page by page.

pub mod auth;
pub mod broker;
pub mod client;
pub mod errors;
pub mod graphql;

// Re-export commonly used types
pub use auth::{authenticate, Credentials, Session};
pub use broker::{PortfolioFetcher, PortfolioFetcherTrait};
pub use client::{LensApiClient, DEFAULT_LENS_API_URL};
pub use errors::{AuthError, ErrorCategory, FetchError};
pub use graphql::{fetch_all, FetchOutcome, GraphQlTransport, QueryDescriptor, ResultPath};
