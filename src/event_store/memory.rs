//! In-memory visit store
//!
//! Backs tests and embedded use. Supports a switchable outage so callers can
//! exercise `StoreUnavailable` paths without a real network store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::types::{EventId, MetricsSnapshot, VisitEvent};
use crate::utils::next_recorded_at;

use super::store::{StoreError, StoreResult, VisitStore};

#[derive(Debug, Default)]
struct Partition {
    last_id: Option<EventId>,
    last_recorded_at: Option<i64>,
    events: BTreeMap<EventId, VisitEvent>,
    metrics: Option<MetricsSnapshot>,
}

impl Partition {
    fn next_id(&mut self) -> EventId {
        let id = self.last_id.map_or(EventId::new(1), EventId::next);
        self.last_id = Some(id);
        id
    }
}

/// In-memory visit store
pub struct MemoryStore {
    partitions: RwLock<BTreeMap<String, Partition>>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backing store going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitStore for MemoryStore {
    fn append(&self, entity_key: &str, mut event: VisitEvent) -> StoreResult<EventId> {
        self.check_available()?;
        let mut partitions = self.partitions.write();
        let partition = partitions.entry(entity_key.to_string()).or_default();

        event.recorded_at = next_recorded_at(event.recorded_at, partition.last_recorded_at);
        partition.last_recorded_at = Some(event.recorded_at);

        let id = partition.next_id();
        partition.events.insert(id, event);
        Ok(id)
    }

    fn read_all(&self, entity_key: &str) -> StoreResult<BTreeMap<EventId, VisitEvent>> {
        self.check_available()?;
        let partitions = self.partitions.read();
        Ok(partitions
            .get(entity_key)
            .map(|p| p.events.clone())
            .unwrap_or_default())
    }

    fn entity_keys(&self) -> StoreResult<Vec<String>> {
        self.check_available()?;
        let partitions = self.partitions.read();
        Ok(partitions
            .iter()
            .filter(|(_, p)| !p.events.is_empty())
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn write_metrics(&self, entity_key: &str, snapshot: &MetricsSnapshot) -> StoreResult<()> {
        self.check_available()?;
        let mut partitions = self.partitions.write();
        partitions.entry(entity_key.to_string()).or_default().metrics = Some(snapshot.clone());
        Ok(())
    }

    fn read_metrics(&self, entity_key: &str) -> StoreResult<Option<MetricsSnapshot>> {
        self.check_available()?;
        let partitions = self.partitions.read();
        Ok(partitions.get(entity_key).and_then(|p| p.metrics.clone()))
    }
}
