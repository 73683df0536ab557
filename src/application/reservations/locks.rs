//! Per-vehicle critical sections
//!
//! Every read-decide-write sequence on a vehicle's reservations runs while
//! holding that vehicle's lock. Different vehicles never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct VehicleLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl VehicleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, vin: &str) -> OwnedMutexGuard<()> {
        // The DashMap shard guard must be released before awaiting.
        let mutex = {
            let entry = self.locks.entry(vin.to_string()).or_default();
            Arc::clone(&*entry)
        };
        mutex.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
