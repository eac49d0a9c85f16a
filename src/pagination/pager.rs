//! Lazy page-by-page enumeration
//!
//! A pager walks each requested partition from its first page until an empty
//! page, buffering one page at a time and handing records out in order. It is
//! exposed as a stream that can be consumed once; the first error ends it.

use super::types::{NextPage, PageNumberPaginator, PaginationState, Partition};
use crate::error::Result;
use crate::types::RecordStream;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fetching {
        partition: usize,
        state: PaginationState,
    },
    Exhausted,
}

struct Pager<T, F> {
    partitions: Vec<Partition>,
    paginator: PageNumberPaginator,
    phase: Phase,
    buffer: VecDeque<T>,
    fetch: F,
}

impl<T, F, Fut> Pager<T, F>
where
    F: FnMut(Partition, u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    fn new(partitions: Vec<Partition>, fetch: F) -> Self {
        let paginator = PageNumberPaginator::default();
        let phase = if partitions.is_empty() {
            Phase::Exhausted
        } else {
            Phase::Fetching {
                partition: 0,
                state: paginator.initial_state(),
            }
        };

        Self {
            partitions,
            paginator,
            phase,
            buffer: VecDeque::new(),
            fetch,
        }
    }

    async fn next_item(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            let Phase::Fetching { partition, state } = &mut self.phase else {
                return Ok(None);
            };
            let index = *partition;
            let current = self.partitions[index];

            let records = (self.fetch)(current, state.page).await?;
            debug!(
                "Fetched {current} page {}: {} records",
                state.page,
                records.len()
            );

            if self.paginator.process_page(records.len(), state) == NextPage::Done {
                self.phase = match self.partitions.get(index + 1) {
                    Some(_) => Phase::Fetching {
                        partition: index + 1,
                        state: self.paginator.initial_state(),
                    },
                    None => Phase::Exhausted,
                };
            }

            self.buffer.extend(records);
        }
    }
}

/// Enumerate every record of every partition, in order.
///
/// `fetch` is called with the partition and page number and returns that
/// page's records; an empty page ends the partition.
pub fn paginate<'a, T, F, Fut>(partitions: Vec<Partition>, fetch: F) -> RecordStream<'a, T>
where
    T: Send + 'a,
    F: FnMut(Partition, u32) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'a,
{
    let pager = Pager::new(partitions, fetch);
    stream::try_unfold(pager, |mut pager| async move {
        let item = pager.next_item().await;
        item.map(|item| item.map(|item| (item, pager)))
    })
    .boxed()
}
