//! Offset pager driven by server-reported totals
//!
//! Requests page after page from a [`RequestExecutor`], learning the total
//! record count and the paging correlation id from the first response, and
//! stops once the offset reaches the total.

use super::types::{PageResponse, PagerConfig, PagingState};
use crate::error::{Error, Result};
use crate::http::{RequestExecutor, RequestSpec, RetryPolicy};
use crate::logging::Logger;
use crate::types::JsonValue;
use std::sync::Arc;

const LABEL: &str = "fetch_all";

/// Everything a completed run collected
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// All records, in server order
    pub records: Vec<JsonValue>,
    /// Total reported by the server
    pub total_count: u64,
    /// Page requests that succeeded
    pub pages: u32,
}

/// Sequential offset pager
pub struct Pager<E> {
    executor: E,
    config: PagerConfig,
    logger: Arc<dyn Logger>,
}

impl<E: RequestExecutor> Pager<E> {
    /// Create a pager over `executor`
    pub fn new(executor: E, config: PagerConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            executor,
            config,
            logger,
        }
    }

    /// Get the wrapped executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Fetch every page and return the concatenated records
    ///
    /// Any failure aborts the run; records from pages already fetched are
    /// dropped with it.
    pub async fn fetch_all(
        &self,
        initial_spec: RequestSpec,
        policy: &RetryPolicy,
    ) -> Result<FetchOutcome> {
        if self.config.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }

        let mut spec = initial_spec;
        let mut state = PagingState::new(self.config.page_size);
        let max_empty_pages = self.config.max_empty_pages.max(1);

        spec.set_query(self.config.limit_param.as_str(), self.config.page_size);

        loop {
            spec.set_query(self.config.offset_param.as_str(), state.offset);
            if let Some(id) = &state.paging_request_id {
                spec.set_query(self.config.paging_id_param.as_str(), id.as_str());
            }

            let first_page = state.total_count.is_none();
            let page = match self.executor.execute(&spec, policy).await.and_then(|response| {
                PageResponse::from_response(
                    response,
                    first_page,
                    self.config.records_field.as_deref(),
                )
            }) {
                Ok(page) => page,
                Err(err) => {
                    self.logger.error(
                        LABEL,
                        &format!("Failed to download page at offset {}", state.offset),
                    );
                    if first_page {
                        return Err(err);
                    }
                    return Err(Error::PageFetchFailed {
                        offset: state.offset,
                        source: Box::new(err),
                    });
                }
            };

            if let Some(total) = page.total_count {
                state.learn(total, page.paging_request_id);
                self.logger.info(
                    LABEL,
                    &format!("Total records to download as reported by the server: {total}"),
                );
                match &state.paging_request_id {
                    Some(id) => self
                        .logger
                        .info(LABEL, &format!("Paging request id: {id}")),
                    None => self
                        .logger
                        .warn(LABEL, "No paging request id returned, continuing without one"),
                }
            }

            let total = state.total_count.unwrap_or_default();
            let page_records = page.records.len();
            state.record_page(page.records);

            if page_records > 0 {
                self.logger.info(
                    LABEL,
                    &format!(
                        "Records downloaded {} of {total}",
                        state.accumulated.len()
                    ),
                );
            } else {
                self.logger.debug(
                    LABEL,
                    &format!("Empty page at offset {} of {total}", state.offset),
                );
            }

            if state.is_complete() {
                break;
            }

            if state.empty_pages >= max_empty_pages {
                self.logger.error(
                    LABEL,
                    &format!(
                        "Giving up after {} consecutive empty pages at offset {}",
                        state.empty_pages, state.offset
                    ),
                );
                return Err(Error::StalledPaging {
                    offset: state.offset,
                    total,
                    empty_pages: state.empty_pages,
                });
            }
        }

        Ok(FetchOutcome {
            total_count: state.total_count.unwrap_or_default(),
            pages: state.pages_fetched,
            records: state.accumulated,
        })
    }
}

impl<E> std::fmt::Debug for Pager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
