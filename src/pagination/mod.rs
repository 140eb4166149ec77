//! Pagination module
//!
//! Offset/limit paging (`skip` + `limit`) with a per-run record budget.
//!
//! # Overview
//!
//! The paginator decides the next `(offset, limit)` to request and when to
//! stop: the source ran dry, the run's record budget is spent, or the next
//! offset would pass the API's `skip` ceiling.

mod offset;
mod types;

pub use offset::OffsetPaginator;
pub use types::{has_more, PageRequest, PaginationState, StopReason, MAX_PAGE_SIZE, MAX_SKIP};
