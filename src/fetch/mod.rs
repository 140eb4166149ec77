//! openFDA fetch module
//!
//! Issues the paged `GET /food/enforcement.json` requests and turns each
//! response into a [`Page`] of raw records.
//!
//! # Overview
//!
//! - `PageSource` - Anything that can serve a page for `(cursor, offset, limit)`
//! - `EnforcementFetcher` - The HTTP implementation against the openFDA API
//! - `Page` - Raw records plus whether more remain

mod fetcher;
mod types;

pub use fetcher::{report_date_search, EnforcementFetcher, DEFAULT_BASE_URL, ENFORCEMENT_PATH};
pub use types::{ApiMeta, ApiResponse, Page, PageSource, ResultsMeta};
