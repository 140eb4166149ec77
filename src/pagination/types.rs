//! Pagination types
//!
//! Defines the request/state types shared by the paginator and the fetcher.

/// Largest page the API will serve
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Largest `skip` the API accepts
pub const MAX_SKIP: u64 = 25_000;

/// One page to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Records to skip (`skip`)
    pub offset: u64,
    /// Records to return (`limit`)
    pub limit: u32,
}

impl PageRequest {
    /// Create a page request
    pub fn new(offset: u64, limit: u32) -> Self {
        Self { offset, limit }
    }
}

/// Why pagination stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source has no more records
    Exhausted,
    /// The run's record budget is spent
    BudgetReached,
    /// The next offset would exceed the API's `skip` ceiling
    SkipCeiling,
}

/// Tracks pagination state during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Records consumed so far in this run (next `skip`)
    pub offset: u64,
    /// Pages fetched so far
    pub pages: u64,
    /// Is the source exhausted?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Record a fetched page
    pub fn add_page(&mut self, returned: u64) {
        self.offset += returned;
        self.pages += 1;
    }
}

/// Whether a page leaves more records to fetch.
///
/// Uses the API's total count when it reports one; otherwise a short page
/// signals the end. An empty page never has more.
pub fn has_more(request: PageRequest, returned: usize, total: Option<u64>) -> bool {
    if returned == 0 {
        return false;
    }
    match total {
        Some(total) => request.offset + (returned as u64) < total,
        None => returned as u64 >= u64::from(request.limit),
    }
}
