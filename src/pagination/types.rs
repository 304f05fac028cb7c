//! Paging types
//!
//! Configuration, per-run state, and the decoded view of one page.

use crate::error::{Error, Result};
use crate::http::ApiResponse;
use crate::types::JsonValue;

/// Response header carrying the size of the full record set
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Response header carrying the paging correlation id
pub const PAGING_REQUEST_ID_HEADER: &str = "x-paging-request-id";

/// Configuration for the offset pager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerConfig {
    /// Records requested per page; the offset advances by this much
    pub page_size: u64,
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for page size
    pub limit_param: String,
    /// Query parameter name for the paging correlation id
    pub paging_id_param: String,
    /// Consecutive empty pages tolerated before giving up
    pub max_empty_pages: u32,
    /// Array field holding the records when the body is an object
    pub records_field: Option<String>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            offset_param: "offset".to_string(),
            limit_param: "max".to_string(),
            paging_id_param: "pagingRequestId".to_string(),
            max_empty_pages: 3,
            records_field: None,
        }
    }
}

impl PagerConfig {
    /// Create a config with the given page size
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    /// Set the tolerated number of consecutive empty pages
    #[must_use]
    pub fn with_max_empty_pages(mut self, max_empty_pages: u32) -> Self {
        self.max_empty_pages = max_empty_pages;
        self
    }

    /// Read records from this field of an object body
    #[must_use]
    pub fn with_records_field(mut self, field: impl Into<String>) -> Self {
        self.records_field = Some(field.into());
        self
    }
}

/// Mutable state of one `fetch_all` run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagingState {
    /// Offset of the next page to request
    pub offset: u64,
    /// Page size, fixed for the run
    pub page_size: u64,
    /// Total learned from the first page
    pub total_count: Option<u64>,
    /// Correlation id learned from the first page
    pub paging_request_id: Option<String>,
    /// Records collected so far, in server order
    pub accumulated: Vec<JsonValue>,
    /// Successful page responses
    pub pages_fetched: u32,
    /// Empty pages seen since the last non-empty one
    pub empty_pages: u32,
}

impl PagingState {
    /// Fresh state at offset zero
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    /// True once the total is known and the offset has reached it
    pub fn is_complete(&self) -> bool {
        self.total_count.is_some_and(|total| self.offset >= total)
    }

    /// Learn total and correlation id; only the first call has any effect
    pub fn learn(&mut self, total_count: u64, paging_request_id: Option<String>) {
        if self.total_count.is_none() {
            self.total_count = Some(total_count);
            self.paging_request_id = paging_request_id;
        }
    }

    /// Fold one page of records into the state
    pub fn record_page(&mut self, records: Vec<JsonValue>) {
        self.pages_fetched += 1;
        if records.is_empty() {
            self.empty_pages += 1;
        } else {
            self.empty_pages = 0;
            self.accumulated.extend(records);
            self.offset += self.page_size;
        }
    }
}

/// One page decoded from an [`ApiResponse`]
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    /// Records in server order
    pub records: Vec<JsonValue>,
    /// `x-total-count`, parsed only for the first page
    pub total_count: Option<u64>,
    /// `x-paging-request-id`, read only for the first page
    pub paging_request_id: Option<String>,
}

impl PageResponse {
    /// Decode a response; `first_page` controls whether headers are required
    pub fn from_response(
        response: ApiResponse,
        first_page: bool,
        records_field: Option<&str>,
    ) -> Result<Self> {
        let (total_count, paging_request_id) = if first_page {
            (
                Some(parse_total_count(&response)?),
                response
                    .header(PAGING_REQUEST_ID_HEADER)
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            )
        } else {
            (None, None)
        };

        Ok(Self {
            records: extract_records(response.body, records_field)?,
            total_count,
            paging_request_id,
        })
    }
}

/// Parse the `x-total-count` header
pub fn parse_total_count(response: &ApiResponse) -> Result<u64> {
    let raw = response
        .header(TOTAL_COUNT_HEADER)
        .ok_or_else(|| Error::malformed_header(TOTAL_COUNT_HEADER, "header is missing"))?;

    raw.trim().parse::<u64>().map_err(|e| {
        Error::malformed_header(TOTAL_COUNT_HEADER, format!("'{raw}' is not a count: {e}"))
    })
}

/// Pull the record list out of a response body
///
/// A top-level array is the record list and `null` means no records. An
/// object is only accepted when `records_field` names an array inside it.
pub fn extract_records(body: JsonValue, records_field: Option<&str>) -> Result<Vec<JsonValue>> {
    match body {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Array(records) => Ok(records),
        JsonValue::Object(mut map) => {
            let Some(field) = records_field else {
                return Err(Error::unexpected_body(
                    "expected a JSON array, got an object (set paging.records_field)",
                ));
            };
            match map.remove(field) {
                None | Some(JsonValue::Null) => Ok(Vec::new()),
                Some(JsonValue::Array(records)) => Ok(records),
                Some(_) => Err(Error::unexpected_body(format!(
                    "field '{field}' is not an array"
                ))),
            }
        }
        other => Err(Error::unexpected_body(format!(
            "expected a JSON array, got {other}"
        ))),
    }
}
