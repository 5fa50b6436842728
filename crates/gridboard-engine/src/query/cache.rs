//! Memoizing cache with per-key in-flight dedup
//!
//! Each key holds at most one slot: either a resolved value or an in-flight
//! load that every concurrent caller awaits. Failed loads evict the slot so
//! a later call retries; invalidation removes slots outright. A load whose
//! driving command is cancelled removes its slot on drop, and one of the
//! remaining waiters takes over as the loader.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::watch;

use gridboard_core::model::{Catalog, ElementsPage, ExecutionData};

use crate::query::key::QueryCacheKey;

/// Failure of a cached load, cloneable so all waiters observe it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct QueryError(pub String);

/// Resolved value of a cache entry
///
/// Values are wrapped in `Arc` so every caller shares one allocation.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Elements(Arc<ElementsPage>),
    Execution(Arc<ExecutionData>),
    Catalog(Arc<Catalog>),
}

type LoadResult = Result<QueryValue, QueryError>;
type LoadSignal = watch::Receiver<Option<LoadResult>>;

enum SlotState {
    /// Load in progress; waiters await the watch signal
    InFlight(LoadSignal),
    Resolved(QueryValue),
}

struct Slot {
    /// Distinguishes this slot from any later slot under the same key, so a
    /// stale loader never clobbers a fresh entry
    generation: u64,
    state: SlotState,
}

/// The shared cache behind the query service
#[derive(Default)]
pub struct QueryCache {
    slots: Mutex<HashMap<QueryCacheKey, Slot>>,
    generation: AtomicU64,
}

enum Role {
    Hit(QueryValue),
    Wait(LoadSignal),
    Load {
        tx: watch::Sender<Option<LoadResult>>,
        generation: u64,
    },
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for `key`, invoking `loader` only if no slot exists
    ///
    /// At most one loader invocation is in flight per key; every concurrent
    /// caller observes the same result. `loader` may be invoked again by
    /// this same call if a previous loader was dropped before completing.
    ///
    /// # Errors
    ///
    /// Propagates the loader's failure to every waiter; the failed slot is
    /// evicted so the next call retries.
    pub async fn get_or_load<F, Fut>(&self, key: QueryCacheKey, loader: F) -> LoadResult
    where
        F: Fn() -> Fut,
        Fut: Future<Output = LoadResult>,
    {
        loop {
            let role = {
                let mut slots = self.lock_slots();
                match slots.get(&key) {
                    Some(Slot {
                        state: SlotState::Resolved(value),
                        ..
                    }) => Role::Hit(value.clone()),
                    Some(Slot {
                        state: SlotState::InFlight(rx),
                        ..
                    }) => Role::Wait(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                        slots.insert(
                            key.clone(),
                            Slot {
                                generation,
                                state: SlotState::InFlight(rx),
                            },
                        );
                        Role::Load { tx, generation }
                    }
                }
            };

            match role {
                Role::Hit(value) => return Ok(value),
                Role::Wait(mut rx) => {
                    let settled = loop {
                        if let Some(result) = rx.borrow().clone() {
                            break Some(result);
                        }
                        if rx.changed().await.is_err() {
                            // Loader dropped before completing; retry and
                            // possibly become the loader ourselves
                            break None;
                        }
                    };
                    match settled {
                        Some(result) => return result,
                        None => continue,
                    }
                }
                Role::Load { tx, generation } => {
                    // Dropped before completion (cancelled command): the
                    // guard evicts the slot, then the watch sender drops
                    // and wakes the waiters into retry
                    let mut guard = LoadGuard {
                        cache: self,
                        key: &key,
                        generation,
                        armed: true,
                    };
                    let result = loader().await;
                    self.settle(&key, generation, &result);
                    guard.armed = false;
                    let _ = tx.send(Some(result.clone()));
                    return result;
                }
            }
        }
    }

    /// Remove every slot whose key matches the predicate
    ///
    /// Returns the number of removed slots. Removing an in-flight slot does
    /// not abort its load: current waiters still observe the result, but it
    /// is not cached and the next query loads fresh.
    pub fn invalidate(&self, pred: impl Fn(&QueryCacheKey) -> bool) -> usize {
        let mut slots = self.lock_slots();
        let before = slots.len();
        slots.retain(|key, _| !pred(key));
        before - slots.len()
    }

    /// Number of slots currently held (resolved or in flight)
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn settle(&self, key: &QueryCacheKey, generation: u64, result: &LoadResult) {
        let mut slots = self.lock_slots();
        let current = match slots.get_mut(key) {
            Some(slot) if slot.generation == generation => slot,
            // Invalidated while loading; waiters still get the result but
            // the cache stays empty for this key
            _ => return,
        };
        match result {
            Ok(value) => current.state = SlotState::Resolved(value.clone()),
            Err(_) => {
                slots.remove(key);
            }
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<QueryCacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct LoadGuard<'a> {
    cache: &'a QueryCache,
    key: &'a QueryCacheKey,
    generation: u64,
    armed: bool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slots = self.cache.lock_slots();
        if let Some(slot) = slots.get(self.key) {
            if slot.generation == self.generation {
                slots.remove(self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn exec_key(fingerprint: &str) -> QueryCacheKey {
        QueryCacheKey::Execution {
            fingerprint: fingerprint.to_string(),
        }
    }

    fn exec_value(marker: f64) -> QueryValue {
        QueryValue::Execution(Arc::new(ExecutionData {
            columns: vec!["m1".to_string()],
            rows: vec![vec![marker]],
        }))
    }

    fn rows(value: &QueryValue) -> Vec<Vec<f64>> {
        match value {
            QueryValue::Execution(data) => data.rows.clone(),
            _ => panic!("expected execution value"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_calls_invoke_loader_once() {
        let cache = QueryCache::new();
        let invocations = Arc::new(AtomicUsize::new(0));

        let loader = || {
            let invocations = invocations.clone();
            async move {
                invocations.fetch_add(1, Ordering::SeqCst);
                // Yield so concurrent callers can register as waiters
                for _ in 0..4 {
                    tokio::task::yield_now().await;
                }
                Ok(exec_value(1.0))
            }
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_load(exec_key("k"), loader),
            cache.get_or_load(exec_key("k"), loader),
            cache.get_or_load(exec_key("k"), loader),
        );

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        assert_eq!(rows(&a.unwrap()), vec![vec![1.0]]);
        assert_eq!(rows(&b.unwrap()), vec![vec![1.0]]);
        assert_eq!(rows(&c.unwrap()), vec![vec![1.0]]);
    }

    #[tokio::test]
    async fn test_resolved_value_is_reused() {
        let cache = QueryCache::new();
        let invocations = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let invocations = invocations.clone();
            let result = cache
                .get_or_load(exec_key("k"), || {
                    let invocations = invocations.clone();
                    async move {
                        invocations.fetch_add(1, Ordering::SeqCst);
                        Ok(exec_value(2.0))
                    }
                })
                .await;
            assert!(result.is_ok());
        }

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_evicted_and_retried() {
        let cache = QueryCache::new();
        let invocations = Arc::new(AtomicUsize::new(0));

        let loader = || {
            let invocations = invocations.clone();
            async move {
                let n = invocations.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(QueryError("backend down".to_string()))
                } else {
                    Ok(exec_value(3.0))
                }
            }
        };

        let first = cache.get_or_load(exec_key("k"), loader).await;
        assert_eq!(first, Err(QueryError("backend down".to_string())));
        assert!(cache.is_empty());

        let second = cache.get_or_load(exec_key("k"), loader).await;
        assert!(second.is_ok());
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_load() {
        let cache = QueryCache::new();
        let invocations = Arc::new(AtomicUsize::new(0));

        let loader = || {
            let invocations = invocations.clone();
            async move {
                invocations.fetch_add(1, Ordering::SeqCst);
                Ok(exec_value(4.0))
            }
        };

        cache.get_or_load(exec_key("k"), loader).await.unwrap();
        let removed = cache.invalidate(|key| key.kind() == crate::query::QueryKind::Execution);
        assert_eq!(removed, 1);

        cache.get_or_load(exec_key("k"), loader).await.unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_load_independently() {
        let cache = QueryCache::new();
        let invocations = Arc::new(AtomicUsize::new(0));

        let loader = || {
            let invocations = invocations.clone();
            async move {
                invocations.fetch_add(1, Ordering::SeqCst);
                Ok(exec_value(5.0))
            }
        };

        cache.get_or_load(exec_key("a"), loader).await.unwrap();
        cache.get_or_load(exec_key("b"), loader).await.unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_loader_hands_over_to_waiter() {
        let cache = Arc::new(QueryCache::new());
        let invocations = Arc::new(AtomicUsize::new(0));

        // First loader parks forever; we drop it mid-flight
        let parked = {
            let cache = cache.clone();
            let invocations = invocations.clone();
            tokio::spawn(async move {
                cache
                    .get_or_load(exec_key("k"), || {
                        let invocations = invocations.clone();
                        async move {
                            invocations.fetch_add(1, Ordering::SeqCst);
                            std::future::pending::<()>().await;
                            unreachable!()
                        }
                    })
                    .await
            })
        };

        // Give the parked loader time to claim the slot
        tokio::task::yield_now().await;
        parked.abort();
        let _ = parked.await;

        let result = cache
            .get_or_load(exec_key("k"), || {
                let invocations = invocations.clone();
                async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    Ok(exec_value(6.0))
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }
}
