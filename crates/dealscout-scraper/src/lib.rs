//! Storefront page loading, item extraction and the worker protocol.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod parse;
pub mod protocol;
pub(crate) mod rate_limit;
pub mod search;
pub(crate) mod strategy;

pub use error::ScraperError;
pub use extract::details::extract_details;
pub use extract::{extract_items, Extraction, ExtractionDiagnostics};
pub use fetch::{looks_blocked, PageFetcher, SourceEndpoints};
pub use filter::{dedup_items, ItemFilter, Rejection};
pub use protocol::{
    dispatch, is_registered_tool, serve, DetailsArgs, ToolCall, ToolResponse, PRODUCT_DETAILS,
    PRODUCT_SCRAPER, REGISTERED_TOOLS,
};
pub use search::{Scraper, SearchOutcome};
