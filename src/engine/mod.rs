//! Metrics Engine - core read and write paths
//!
//! The engine owns no state beyond a handle to the store (and, when enabled,
//! the per-entity lock table). It is `Send + Sync` and meant to be shared
//! behind an `Arc`.
//!
//! Concurrent `record_visit` calls for the same entity race on the recompute
//! step unless `serialize_per_entity` is set: the stored snapshot is whichever
//! recompute ran last. Because recompute always derives from the full log, a
//! later `recompute` converges once writes stop.

mod aggregate;
mod history;
mod locks;
mod recorder;
mod venue_scan;

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::event_store::{FileStore, MemoryStore, VisitStore};
use crate::types::{
    EventId, HistoryQuery, MetricsSnapshot, NewVisit, RepairReport, StoredVisit, VenueQuery,
    VenueVisit,
};

pub use aggregate::compute_snapshot;

use locks::EntityLocks;

/// Guest-visit metrics engine over a shared visit store
pub struct MetricsEngine {
    pub(crate) store: Arc<dyn VisitStore>,
    pub(crate) config: EngineConfig,
    pub(crate) locks: EntityLocks,
}

impl MetricsEngine {
    /// Create an engine over the given store with default config
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine over the given store with custom config
    pub fn with_config(store: Arc<dyn VisitStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: EntityLocks::default(),
        }
    }

    /// Open a file-backed engine rooted at `config.data_dir`
    pub fn open(config: EngineConfig) -> EngineResult<Self> {
        let store = FileStore::open(&config.data_dir)?;
        Ok(Self::with_config(Arc::new(store), config))
    }

    /// Engine over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Get the configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<dyn VisitStore> {
        &self.store
    }
}

impl MetricsEngine {
    // Write path (from recorder.rs)
    pub fn record_visit(&self, entity_key: &str, visit: NewVisit) -> EngineResult<EventId> {
        recorder::record_visit(self, entity_key, visit)
    }

    // Aggregation (from aggregate.rs)
    pub fn recompute(&self, entity_key: &str) -> EngineResult<MetricsSnapshot> {
        aggregate::recompute(self, entity_key)
    }

    pub fn get_metrics(&self, entity_key: &str) -> EngineResult<Option<MetricsSnapshot>> {
        aggregate::get_metrics(self, entity_key)
    }

    pub fn recompute_all(&self) -> EngineResult<RepairReport> {
        aggregate::recompute_all(self)
    }

    // Read paths (from history.rs and venue_scan.rs)
    pub fn get_history(
        &self,
        entity_key: &str,
        query: HistoryQuery,
    ) -> EngineResult<Vec<StoredVisit>> {
        history::get_history(self, entity_key, query)
    }

    pub fn get_venue_visits(
        &self,
        venue_id: &str,
        query: VenueQuery,
    ) -> EngineResult<Vec<VenueVisit>> {
        venue_scan::get_venue_visits(self, venue_id, query)
    }
}
