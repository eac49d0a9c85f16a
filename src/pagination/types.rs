//! Pagination types
//!
//! Defines the page-number bookkeeping shared by every paginated resource.

use std::fmt;

/// Active or archived subset of a resource, fetched independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Active,
    Archived,
}

impl Partition {
    /// Value of the `archived` query parameter
    pub fn is_archived(self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Partitions to fetch, in order: active always, archived on request
    pub fn for_request(fetch_archived: bool) -> Vec<Partition> {
        if fetch_archived {
            vec![Self::Active, Self::Archived]
        } else {
            vec![Self::Active]
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Archived => f.write_str("archived"),
        }
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this page next
    Continue { page: u32 },
    /// No more pages
    Done,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Page to request next
    pub page: u32,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create state with a starting page
    pub fn with_page(page: u32) -> Self {
        Self { page, done: false }
    }
}

/// Page number pagination that stops on the first empty page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageNumberPaginator {
    /// First page number
    pub start_page: u32,
}

impl PageNumberPaginator {
    /// Initial state for a fresh pass
    pub fn initial_state(&self) -> PaginationState {
        PaginationState::with_page(self.start_page)
    }

    /// Record a fetched page and compute what comes next
    pub fn process_page(&self, records_count: usize, state: &mut PaginationState) -> NextPage {
        if records_count == 0 {
            state.done = true;
            return NextPage::Done;
        }

        state.page += 1;
        NextPage::Continue { page: state.page }
    }
}
