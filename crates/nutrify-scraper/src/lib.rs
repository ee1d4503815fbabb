//! Product data aggregation from Open Food Facts: the JSON catalog API and
//! the public product page.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod extract;
pub mod normalize;
mod rate_limit;
pub mod types;

pub use aggregate::{AggregatorConfig, ProductAggregator};
pub use client::{OffClient, ProductPage};
pub use error::ScraperError;
pub use extract::{ExtractionRule, PageFields};
pub use types::OffProductResponse;
