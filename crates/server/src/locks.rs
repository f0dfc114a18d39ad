use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-class write locks.
///
/// Holding a class's guard across "write lesson, count, evaluate" keeps two
/// requests in this process from both observing the quota crossing. Other
/// processes sharing the database are not coordinated.
pub struct ClassLocks {
    enabled: bool,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ClassLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to a class. Returns `None` when disabled.
    pub async fn acquire(&self, class_id: &str) -> Option<OwnedMutexGuard<()>> {
        if !self.enabled {
            return None;
        }

        // Clone the Arc out so the map shard is not held across the await
        let lock = self
            .locks
            .entry(class_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        Some(lock.lock_owned().await)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
