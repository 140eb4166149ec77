//! Offset paginator
//!
//! Walks `skip`/`limit` pages, shrinking the last page so that a run never
//! fetches more than its record budget.

use super::types::{PageRequest, PaginationState, StopReason, MAX_PAGE_SIZE, MAX_SKIP};

/// Offset-based paginator with a record budget
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Records per request
    page_size: u32,
    /// Records allowed in this run
    max_records: u64,
    /// Largest offset the API accepts
    max_skip: u64,
    state: PaginationState,
}

impl OffsetPaginator {
    /// Create a paginator; `page_size` is clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(page_size: u32, max_records: u64) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            max_records,
            max_skip: MAX_SKIP,
            state: PaginationState::new(),
        }
    }

    /// Override the `skip` ceiling
    #[must_use]
    pub fn with_max_skip(mut self, max_skip: u64) -> Self {
        self.max_skip = max_skip;
        self
    }

    /// Get the page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Get the current state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Records consumed so far
    pub fn offset(&self) -> u64 {
        self.state.offset
    }

    /// Records still allowed in this run
    pub fn remaining(&self) -> u64 {
        self.max_records.saturating_sub(self.state.offset)
    }

    /// Why pagination is over, or `None` if another page should be fetched
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.state.done {
            Some(StopReason::Exhausted)
        } else if self.remaining() == 0 {
            Some(StopReason::BudgetReached)
        } else if self.state.offset > self.max_skip {
            Some(StopReason::SkipCeiling)
        } else {
            None
        }
    }

    /// The next page to request, if any
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.stop_reason().is_some() {
            return None;
        }
        let limit = u64::from(self.page_size).min(self.remaining()) as u32;
        Some(PageRequest::new(self.state.offset, limit))
    }

    /// Record the result of a page
    pub fn record_page(&mut self, returned: usize, has_more: bool) {
        self.state.add_page(returned as u64);
        if !has_more {
            self.state.mark_done();
        }
    }
}
