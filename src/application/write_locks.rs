//! Per-id mutual exclusion for write sequences.
//!
//! Holding the guard across "store write, then cache write" makes both layers
//! agree on the last writer for that id within one process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of lazily created per-id async mutexes.
///
/// Entries are held weakly and pruned once no guard or waiter references them.
#[derive(Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<i64, Weak<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `id`.
    pub async fn lock(&self, id: i64) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.retain(|_, weak| weak.strong_count() > 0);

            match slots.get(&id).and_then(Weak::upgrade) {
                Some(slot) => slot,
                None => {
                    let slot = Arc::new(AsyncMutex::new(()));
                    slots.insert(id, Arc::downgrade(&slot));
                    slot
                }
            }
        };

        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_id_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let guard = locks.lock(1).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(1).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_ids_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock(1).await;
        let _b = locks.lock(2).await;

        assert_eq!(locks.slots.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_released_slots_are_pruned() {
        let locks = KeyedLocks::new();
        drop(locks.lock(1).await);
        drop(locks.lock(2).await);

        // Dead slots are dropped the next time any id is locked.
        let _c = locks.lock(3).await;
        let slots = locks.slots.lock().unwrap();
        assert_eq!(slots.len(), 1);
        assert!(slots.contains_key(&3));
    }
}
