//! Visit Store - the adapter contract over the backing store
//!
//! The engine needs only a handful of primitives from persistence: append
//! with a generated id, read an entity's subtree, a range query over
//! `recordedAt` with a limit, entity enumeration, and whole-record metrics
//! reads and writes. Backends implement `VisitStore`; no business logic lives
//! here.

use std::collections::BTreeMap;

use crate::types::{tail_limit, EventId, MetricsSnapshot, StoredVisit, TimeRange, VisitEvent};
use crate::utils::AtomicError;

/// Result type for VisitStore operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in VisitStore operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backing store unreachable: {0}")]
    Unavailable(String),

    #[error("Corrupted record for '{entity_key}': {reason}")]
    Corrupted { entity_key: String, reason: String },
}

impl From<AtomicError> for StoreError {
    fn from(e: AtomicError) -> Self {
        match e {
            AtomicError::Io(e) => StoreError::Io(e),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Abstraction over the persistent keyed-event store
///
/// Layout (logical):
///
/// ```text
/// entities/<entityKey>/events/<eventId>  -> VisitEvent
/// entities/<entityKey>/metrics           -> MetricsSnapshot
/// ```
pub trait VisitStore: Send + Sync {
    /// Append an event under an entity, returning the generated id.
    ///
    /// `event.recorded_at` is a lower bound: the stored value is
    /// `max(event.recorded_at, last + 1)`, chosen under the same lock that
    /// assigns the id, so `recordedAt` strictly increases per entity even
    /// with concurrent writers. The event is not visible to readers until
    /// this returns.
    fn append(&self, entity_key: &str, event: VisitEvent) -> StoreResult<EventId>;

    /// Read an entity's full event log, keyed by id in insertion order.
    ///
    /// An unknown entity has an empty log.
    fn read_all(&self, entity_key: &str) -> StoreResult<BTreeMap<EventId, VisitEvent>>;

    /// Keys of every entity that has an event log
    fn entity_keys(&self) -> StoreResult<Vec<String>>;

    /// Replace an entity's metrics snapshot with a single write
    fn write_metrics(&self, entity_key: &str, snapshot: &MetricsSnapshot) -> StoreResult<()>;

    /// Read an entity's cached metrics snapshot
    fn read_metrics(&self, entity_key: &str) -> StoreResult<Option<MetricsSnapshot>>;

    /// Events whose `recordedAt` falls in `range`, ascending by `recordedAt`,
    /// keeping only the last `limit` matches.
    fn read_range(
        &self,
        entity_key: &str,
        range: TimeRange,
        limit: Option<usize>,
    ) -> StoreResult<Vec<StoredVisit>> {
        let mut matches: Vec<StoredVisit> = self
            .read_all(entity_key)?
            .into_iter()
            .filter(|(_, event)| range.contains(event.recorded_at))
            .map(|(id, event)| StoredVisit::new(id, event))
            .collect();

        // Stable sort keeps id order for equal timestamps
        matches.sort_by_key(StoredVisit::recorded_at);

        Ok(match limit {
            Some(limit) => tail_limit(matches, limit),
            None => matches,
        })
    }
}
