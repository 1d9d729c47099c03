//! Per-entity lock table
//!
//! Only used when `serialize_per_entity` is enabled. Entries are never
//! removed; the table grows with the number of distinct entities written by
//! this process.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Default)]
pub(crate) struct EntityLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EntityLocks {
    /// The lock guarding one entity, created on first use
    pub(crate) fn lock_for(&self, entity_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(entity_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
