//! Pagination module
//!
//! Offset paging driven by the `x-total-count` response header.
//!
//! # Overview
//!
//! The [`Pager`] calls the request executor once per page, strictly in
//! sequence. The first response tells it how many records exist and which
//! paging request id binds the pages together; every later request carries
//! that id and an offset advanced by the page size.

mod pager;
mod types;

pub use pager::{FetchOutcome, Pager};
pub use types::{
    extract_records, parse_total_count, PageResponse, PagerConfig, PagingState,
    PAGING_REQUEST_ID_HEADER, TOTAL_COUNT_HEADER,
};
