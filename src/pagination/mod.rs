//! Pagination module
//!
//! # Overview
//!
//! Leaf resources are fetched page by page with a zero-based page number.
//! An empty page signals the end. Resources with an archived partition are
//! paged twice: the active partition to exhaustion, then the archived one.

mod pager;
mod types;

pub use pager::paginate;
pub use types::{NextPage, PageNumberPaginator, PaginationState, Partition};

#[cfg(test)]
mod tests;
