//! Fetch types
//!
//! Wire types for openFDA responses and the page abstraction the engine
//! consumes.

use crate::error::Result;
use crate::pagination::PageRequest;
use crate::types::JsonValue;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

/// Top-level openFDA response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub meta: Option<ApiMeta>,
    /// Kept untyped so a non-array can be reported as a decode error
    #[serde(default)]
    pub results: Option<JsonValue>,
}

/// `meta` block of a response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMeta {
    #[serde(default)]
    pub results: Option<ResultsMeta>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// `meta.results` block: paging echo and total match count
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsMeta {
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub code: String,
}

/// One page of raw enforcement records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Raw records, in API order
    pub records: Vec<JsonValue>,
    /// Whether another page should be requested
    pub has_more: bool,
    /// Total matching records, when the API reports it
    pub total: Option<u64>,
}

impl Page {
    /// A final page with no records
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of records on the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of record pages
///
/// `since` is the inclusive lower bound on `report_date`; `None` means no
/// lower bound (full history).
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page
    async fn fetch(&self, since: Option<NaiveDate>, request: PageRequest) -> Result<Page>;
}
