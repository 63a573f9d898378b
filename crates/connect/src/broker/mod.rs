pub mod queries;
mod service;
mod traits;

pub use service::PortfolioFetcher;
pub use traits::*;
