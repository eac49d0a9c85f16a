//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use futures::TryStreamExt;
use std::sync::{Arc, Mutex};

// ============================================================================
// PageNumberPaginator Tests
// ============================================================================

#[test]
fn test_page_number_paginator_advances_until_empty() {
    let paginator = PageNumberPaginator::default();
    let mut state = paginator.initial_state();
    assert_eq!(state, PaginationState { page: 0, done: false });

    assert_eq!(
        paginator.process_page(100, &mut state),
        NextPage::Continue { page: 1 }
    );
    assert_eq!(
        paginator.process_page(3, &mut state),
        NextPage::Continue { page: 2 }
    );
    assert_eq!(paginator.process_page(0, &mut state), NextPage::Done);

    assert!(state.done);
    assert_eq!(state.page, 2);
}

#[test]
fn test_page_number_paginator_custom_start() {
    let paginator = PageNumberPaginator { start_page: 5 };
    let mut state = paginator.initial_state();
    assert_eq!(
        paginator.process_page(1, &mut state),
        NextPage::Continue { page: 6 }
    );
}

#[test]
fn test_partitions_for_request() {
    assert_eq!(Partition::for_request(false), vec![Partition::Active]);
    assert_eq!(
        Partition::for_request(true),
        vec![Partition::Active, Partition::Archived]
    );
    assert!(Partition::Archived.is_archived());
    assert_eq!(Partition::Active.to_string(), "active");
}

// ============================================================================
// paginate() Tests
// ============================================================================

type Calls = Arc<Mutex<Vec<(Partition, u32)>>>;

/// Serve `pages` for the active partition and `archived` for the archived one,
/// followed by an empty page each
fn pages_source(
    active: Vec<Vec<u32>>,
    archived: Vec<Vec<u32>>,
    calls: Calls,
) -> impl FnMut(Partition, u32) -> futures::future::Ready<Result<Vec<u32>>> {
    move |partition, page| {
        calls.lock().unwrap().push((partition, page));
        let pages = match partition {
            Partition::Active => &active,
            Partition::Archived => &archived,
        };
        futures::future::ready(Ok(pages.get(page as usize).cloned().unwrap_or_default()))
    }
}

#[tokio::test]
async fn test_paginate_yields_all_pages_in_order() {
    let calls: Calls = Arc::default();
    let source = pages_source(
        vec![vec![1, 2, 3], vec![4, 5], vec![6]],
        vec![],
        Arc::clone(&calls),
    );

    let records: Vec<u32> = paginate(Partition::for_request(false), source)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(records, vec![1, 2, 3, 4, 5, 6]);
    // K pages plus the terminating empty page
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            (Partition::Active, 0),
            (Partition::Active, 1),
            (Partition::Active, 2),
            (Partition::Active, 3),
        ]
    );
}

#[tokio::test]
async fn test_paginate_active_then_archived() {
    let calls: Calls = Arc::default();
    let source = pages_source(vec![vec![1], vec![2]], vec![vec![10]], Arc::clone(&calls));

    let records: Vec<u32> = paginate(Partition::for_request(true), source)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(records, vec![1, 2, 10]);
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[3], (Partition::Archived, 0));
    assert_eq!(calls[4], (Partition::Archived, 1));
}

#[tokio::test]
async fn test_paginate_without_archived_never_touches_archived() {
    let calls: Calls = Arc::default();
    let source = pages_source(vec![vec![1]], vec![vec![99]], Arc::clone(&calls));

    let records: Vec<u32> = paginate(Partition::for_request(false), source)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(records, vec![1]);
    assert!(calls
        .lock()
        .unwrap()
        .iter()
        .all(|(partition, _)| *partition == Partition::Active));
}

#[tokio::test]
async fn test_paginate_empty_first_page() {
    let calls: Calls = Arc::default();
    let source = pages_source(vec![], vec![], Arc::clone(&calls));

    let records: Vec<u32> = paginate(Partition::for_request(false), source)
        .try_collect()
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_paginate_is_lazy() {
    use futures::StreamExt;

    let calls: Calls = Arc::default();
    let source = pages_source(vec![vec![1, 2], vec![3]], vec![], Arc::clone(&calls));

    let mut stream = paginate(Partition::for_request(false), source);
    assert!(calls.lock().unwrap().is_empty());

    assert_eq!(stream.next().await.unwrap().unwrap(), 1);
    assert_eq!(stream.next().await.unwrap().unwrap(), 2);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_paginate_error_ends_stream() {
    use futures::StreamExt;

    let mut page_calls = 0;
    let source = move |_partition: Partition, page: u32| {
        page_calls += 1;
        let result = if page == 0 {
            Ok(vec![1, 2])
        } else {
            Err(Error::Other(format!("page {page} failed after {page_calls} calls")))
        };
        futures::future::ready(result)
    };

    let mut stream = paginate(Partition::for_request(true), source);
    assert_eq!(stream.next().await.unwrap().unwrap(), 1);
    assert_eq!(stream.next().await.unwrap().unwrap(), 2);

    let err = stream.next().await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "page 1 failed after 2 calls");
    assert!(stream.next().await.is_none());
}
