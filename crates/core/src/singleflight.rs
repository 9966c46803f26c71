//! Keyed single-flight execution.
//!
//! Concurrent callers asking for the same key while an operation is in
//! flight await that one operation and receive a clone of its output. The
//! registry entry is removed as soon as the operation settles, so the next
//! caller after settlement starts a fresh operation.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};

type InFlight<K, V> = Arc<Mutex<HashMap<K, Shared<BoxFuture<'static, V>>>>>;

/// Collapses concurrent operations for the same key onto one execution.
pub struct SingleFlight<K, V> {
    in_flight: InFlight<K, V>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `operation` for `key`, or join the execution already in flight.
    ///
    /// `operation` is only invoked when no execution for `key` is pending.
    pub async fn run<F, Fut>(&self, key: K, operation: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let shared = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            match in_flight.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    let guard = RemoveOnDrop {
                        in_flight: Arc::clone(&self.in_flight),
                        key: key.clone(),
                    };
                    let fut = operation();
                    let shared = async move {
                        let _guard = guard;
                        fut.await
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key, shared.clone());
                    shared
                }
            }
        };

        shared.await
    }

    /// Number of keys with an execution currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .map(|m| m.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

/// Removes the registry entry when the wrapped operation finishes or is dropped.
struct RemoveOnDrop<K: Eq + Hash, V> {
    in_flight: InFlight<K, V>,
    key: K,
}

impl<K: Eq + Hash, V> Drop for RemoveOnDrop<K, V> {
    fn drop(&mut self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.key);
    }
}
