//! Engine errors

use crate::event_store::StoreError;
use crate::types::EventId;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by the metrics engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed visit input; rejected before any store access
    #[error("invalid visit: {0}")]
    InvalidVisit(String),

    /// Blank entity key; rejected before any store access
    #[error("invalid entity key: {0}")]
    InvalidEntityKey(String),

    /// Backing store failure, surfaced unmodified
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The visit was appended but recomputing the snapshot failed
    #[error("visit {event_id} recorded but metrics may be stale: {source}")]
    MetricsStale {
        event_id: EventId,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    /// True when the failure came from the backing store
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            EngineError::StoreUnavailable(_) | EngineError::MetricsStale { .. }
        )
    }

    /// Id of an event that was persisted despite the error
    pub fn recorded_event(&self) -> Option<EventId> {
        match self {
            EngineError::MetricsStale { event_id, .. } => Some(*event_id),
            _ => None,
        }
    }
}

/// Reject blank entity keys before they reach the store
pub(crate) fn validate_entity_key(entity_key: &str) -> EngineResult<()> {
    if entity_key.trim().is_empty() {
        return Err(EngineError::InvalidEntityKey(
            "entity key must not be empty".to_string(),
        ));
    }
    Ok(())
}
