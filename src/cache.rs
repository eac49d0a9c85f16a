//! Memoized hierarchy lookups
//!
//! Workspaces, spaces, folders and lists change rarely compared to how often
//! they are requested while paginating tasks, so each lookup result is kept
//! for the lifetime of the client. Population is compute-once per key:
//! concurrent callers asking for the same key share a single fetch.

use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Cache key for a hierarchy lookup: the parent ID and the archived flag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    /// ID of the container whose children are looked up
    pub id: String,
    /// Whether archived children were requested too
    pub archived: bool,
}

impl LookupKey {
    /// Create a key
    pub fn new(id: impl Into<String>, archived: bool) -> Self {
        Self {
            id: id.into(),
            archived,
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.id, self.archived)
    }
}

/// Keyed compute-once cache for one lookup operation
pub struct LookupCache<K, V> {
    name: &'static str,
    entries: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K, V> LookupCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    /// Create an empty cache for the named operation
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, running `fetch` if there is none.
    ///
    /// Errors are returned to the caller and not cached.
    pub async fn get_or_try_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(key.clone()).or_default())
        };

        if let Some(value) = cell.get() {
            tracing::trace!("{} cache hit for {key}", self.name);
            return Ok(Arc::clone(value));
        }

        let value = cell
            .get_or_try_init(|| async move {
                tracing::debug!("{} cache miss for {key}", self.name);
                fetch().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(value))
    }

    /// Number of populated entries
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    /// Whether no entry is populated
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether a value is cached for `key`
    pub async fn contains(&self, key: &K) -> bool {
        let entries = self.entries.lock().await;
        entries.get(key).is_some_and(|cell| cell.initialized())
    }
}

impl<K, V> fmt::Debug for LookupCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupCache")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_repeated_key_fetches_once() {
        let cache: LookupCache<LookupKey, Vec<u32>> = LookupCache::new("spaces");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_fetch(LookupKey::new("42", false), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2])
                })
                .await
                .unwrap();
            assert_eq!(*value, vec![1, 2]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_archived_flag_is_part_of_key() {
        let cache: LookupCache<LookupKey, Vec<&str>> = LookupCache::new("folders");

        let active = cache
            .get_or_try_fetch(LookupKey::new("7", false), || async { Ok(vec!["a"]) })
            .await
            .unwrap();
        let all = cache
            .get_or_try_fetch(LookupKey::new("7", true), || async { Ok(vec!["a", "b"]) })
            .await
            .unwrap();

        assert_eq!(*active, vec!["a"]);
        assert_eq!(*all, vec!["a", "b"]);
        assert!(cache.contains(&LookupKey::new("7", true)).await);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: LookupCache<LookupKey, u8> = LookupCache::new("lists");
        let key = LookupKey::new("1", false);

        let err = cache
            .get_or_try_fetch(key.clone(), || async { Err(Error::Other("boom".into())) })
            .await;
        assert!(err.is_err());
        assert!(cache.is_empty().await);

        let ok = cache
            .get_or_try_fetch(key.clone(), || async { Ok(9) })
            .await
            .unwrap();
        assert_eq!(*ok, 9);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache: Arc<LookupCache<LookupKey, u64>> = Arc::new(LookupCache::new("spaces"));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_try_fetch(LookupKey::new("9", false), || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(99)
                        })
                        .await
                        .map(|v| *v)
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 99);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lookup_key_display() {
        assert_eq!(LookupKey::new("123", true).to_string(), "123;true");
    }
}
