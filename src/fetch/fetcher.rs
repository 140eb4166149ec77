//! openFDA enforcement fetcher
//!
//! One call to [`EnforcementFetcher::fetch`] is one page request. Retries and
//! request spacing happen inside the [`HttpClient`].

use super::types::{ApiErrorBody, ApiResponse, Page, PageSource};
use crate::config::ConnectorConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::models::{format_fda_date, CURSOR_FIELD};
use crate::pagination::{has_more, PageRequest};
use crate::types::JsonValue;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.fda.gov";

/// Food enforcement endpoint, relative to the base URL
pub const ENFORCEMENT_PATH: &str = "/food/enforcement.json";

/// Error code openFDA sends with a 404 when a search matches nothing
const NOT_FOUND_CODE: &str = "NOT_FOUND";

/// Build the `search` expression for records reported in `[since, until]`
pub fn report_date_search(since: NaiveDate, until: NaiveDate) -> String {
    format!(
        "{CURSOR_FIELD}:[{} TO {}]",
        format_fda_date(since),
        format_fda_date(until)
    )
}

/// Fetches food enforcement pages from openFDA
#[derive(Debug)]
pub struct EnforcementFetcher {
    client: HttpClient,
    path: String,
    /// Fixed upper bound for the date range; today (UTC) when unset
    until: Option<NaiveDate>,
}

impl EnforcementFetcher {
    /// Wrap a configured client (base URL and `api_key` already set)
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            path: ENFORCEMENT_PATH.to_string(),
            until: None,
        }
    }

    /// Build the client from connector configuration
    pub fn from_config(config: &ConnectorConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self::new(client))
    }

    /// Pin the upper end of the date range instead of using today
    #[must_use]
    pub fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    /// Query parameters for one page
    pub fn build_request(&self, since: Option<NaiveDate>, request: PageRequest) -> RequestConfig {
        let mut config = RequestConfig::new()
            .query("limit", request.limit.to_string())
            .query("skip", request.offset.to_string())
            .query("sort", format!("{CURSOR_FIELD}:asc"));

        if let Some(since) = since {
            let until = self
                .until
                .unwrap_or_else(|| Utc::now().date_naive())
                .max(since);
            config = config.query("search", report_date_search(since, until));
        }

        config
    }

    /// Decode a successful response body into a page
    fn parse_page(body: &str, request: PageRequest) -> Result<Page> {
        let response: ApiResponse = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("response is not valid JSON: {e}")))?;

        let records = match response.results {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(records)) => records,
            Some(other) => {
                return Err(Error::decode(format!(
                    "expected 'results' to be an array, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let total = response
            .meta
            .and_then(|meta| meta.results)
            .and_then(|results| results.total);

        Ok(Page {
            has_more: has_more(request, records.len(), total),
            records,
            total,
        })
    }
}

#[async_trait]
impl PageSource for EnforcementFetcher {
    async fn fetch(&self, since: Option<NaiveDate>, request: PageRequest) -> Result<Page> {
        debug!(
            offset = request.offset,
            limit = request.limit,
            since = ?since,
            "Fetching enforcement page"
        );

        let config = self.build_request(since, request);
        let body = match self.client.get_with_config(&self.path, config).await {
            Ok(body) => body,
            Err(Error::HttpStatus { status: 404, body }) if is_not_found(&body) => {
                debug!(offset = request.offset, "No matching records");
                return Ok(Page::empty());
            }
            Err(e) => return Err(e),
        };

        let page = Self::parse_page(&body, request)?;

        debug!(
            returned = page.len(),
            total = ?page.total,
            has_more = page.has_more,
            "Fetched enforcement page"
        );
        Ok(page)
    }
}

/// Whether a 404 body is openFDA's "no matches" answer
fn is_not_found(body: &str) -> bool {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.code == NOT_FOUND_CODE)
        .unwrap_or(false)
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
