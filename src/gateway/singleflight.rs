//! Single-flight call deduplication
//!
//! Concurrent callers asking for the same key share one in-flight future.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use futures::ready;

type Flight<T> = Shared<BoxFuture<'static, T>>;

struct Entry<T> {
    /// Distinguishes successive flights under the same key
    id: u64,
    handle: WeakShared<BoxFuture<'static, T>>,
}

struct Table<T> {
    next_id: u64,
    entries: HashMap<String, Entry<T>>,
}

/// Table of in-flight calls keyed by string.
///
/// Only weak handles are stored, so a call whose callers have all gone away
/// is dropped (and its outbound I/O cancelled) instead of being kept alive
/// by the table. The last caller to leave, finished or not, removes the key.
pub struct SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    table: Mutex<Table<T>>,
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            table: Mutex::new(Table {
                next_id: 0,
                entries: HashMap::new(),
            }),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the future built by `start`, or joins the live call for `key`.
    ///
    /// `start` is invoked only when no call for `key` is in flight. Every
    /// caller receives a clone of the same output.
    pub async fn run<F, Fut>(&self, key: &str, start: F) -> T
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send + 'static,
    {
        let waiter = {
            let mut table = self.lock();
            let live = table.entries.get(key).and_then(|entry| {
                entry
                    .handle
                    .upgrade()
                    .map(|flight| (entry.id, flight))
            });

            match live {
                Some((id, flight)) => {
                    tracing::debug!(key, "Joining in-flight call");
                    Waiter::new(self, key, id, flight)
                }
                None => {
                    table.next_id += 1;
                    let id = table.next_id;
                    let flight = start().boxed().shared();
                    if let Some(handle) = flight.downgrade() {
                        table.entries.insert(key.to_string(), Entry { id, handle });
                    }
                    Waiter::new(self, key, id, flight)
                }
            }
        };

        waiter.await
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Table<T>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Waiter ==
/// One caller's stake in a flight.
///
/// Holds the caller's only strong handle so that dropping the waiter
/// releases it before the table entry is checked.
struct Waiter<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    owner: &'a SingleFlight<T>,
    key: &'a str,
    id: u64,
    flight: Option<Flight<T>>,
    finished: bool,
}

impl<'a, T> Waiter<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(owner: &'a SingleFlight<T>, key: &'a str, id: u64, flight: Flight<T>) -> Self {
        Self {
            owner,
            key,
            id,
            flight: Some(flight),
            finished: false,
        }
    }
}

impl<T> Future for Waiter<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let Some(flight) = self.flight.as_mut() else {
            return Poll::Pending;
        };
        let output = ready!(flight.poll_unpin(cx));

        self.flight = None;
        self.finished = true;
        Poll::Ready(output)
    }
}

impl<T> Drop for Waiter<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        // Released outside the lock: if this was the last handle, the
        // abandoned call is dropped here.
        drop(self.flight.take());

        let mut table = self.owner.lock();
        let stale = match table.entries.get(self.key) {
            Some(entry) if entry.id == self.id => {
                self.finished || entry.handle.upgrade().is_none()
            }
            _ => false,
        };
        if stale {
            table.entries.remove(self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_calls_share_one_execution() {
        let flights = Arc::new(SingleFlight::<usize>::new());
        let executions = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flights = flights.clone();
            let executions = executions.clone();
            handles.push(tokio::spawn(async move {
                flights
                    .run("tree::biology", move || async move {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        executions.fetch_add(1, Ordering::SeqCst) + 1
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(flights.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_run_separately() {
        let flights = SingleFlight::<String>::new();

        let (a, b) = tokio::join!(
            flights.run("a", || async { "first".to_string() }),
            flights.run("b", || async { "second".to_string() }),
        );

        assert_eq!(a, "first");
        assert_eq!(b, "second");
    }

    #[tokio::test]
    async fn test_sequential_calls_run_again() {
        let flights = SingleFlight::<usize>::new();
        let executions = Arc::new(AtomicUsize::new(0));

        for expected in 1..=2 {
            let executions = executions.clone();
            let value = flights
                .run("k", move || async move { executions.fetch_add(1, Ordering::SeqCst) + 1 })
                .await;
            assert_eq!(value, expected);
        }
    }

    #[tokio::test]
    async fn test_abandoned_call_is_dropped() {
        let flights = Arc::new(SingleFlight::<()>::new());
        let finished = Arc::new(AtomicUsize::new(0));

        let task = {
            let flights = flights.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                flights
                    .run("slow", move || async move {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        task.abort();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert!(flights.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_keys_do_not_accumulate() {
        let flights = Arc::new(SingleFlight::<()>::new());

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let flights = flights.clone();
                tokio::spawn(async move {
                    flights
                        .run(&format!("object{}::art", i), || async {
                            tokio::time::sleep(Duration::from_secs(10)).await;
                        })
                        .await
                })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(flights.len(), 50);

        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            let _ = task.await;
        }

        assert!(flights.is_empty());
    }

    #[tokio::test]
    async fn test_one_waiter_leaving_keeps_flight_for_others() {
        let flights = Arc::new(SingleFlight::<usize>::new());
        let executions = Arc::new(AtomicUsize::new(0));

        let spawn_waiter = |flights: Arc<SingleFlight<usize>>, executions: Arc<AtomicUsize>| {
            tokio::spawn(async move {
                flights
                    .run("tree::art", move || async move {
                        tokio::time::sleep(Duration::from_millis(150)).await;
                        executions.fetch_add(1, Ordering::SeqCst) + 1
                    })
                    .await
            })
        };

        let leaving = spawn_waiter(flights.clone(), executions.clone());
        let staying = spawn_waiter(flights.clone(), executions.clone());

        tokio::time::sleep(Duration::from_millis(30)).await;
        leaving.abort();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Still tracked, so a late caller joins instead of starting over.
        assert_eq!(flights.len(), 1);
        let late = spawn_waiter(flights.clone(), executions.clone());

        assert_eq!(staying.await.unwrap(), 1);
        assert_eq!(late.await.unwrap(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(flights.is_empty());
    }
}
