//! Visit Recorder
//!
//! Append, then recompute. The two steps are separate store operations: if the
//! recompute fails the visit stays recorded and the caller gets
//! `MetricsStale`, which any later recompute repairs.
//!
//! The store picks the final `recordedAt` inside its append, so concurrent
//! writers to one entity never share a timestamp whether or not
//! `serialize_per_entity` is on.

use tracing::{debug, warn};

use crate::error::{validate_entity_key, EngineError, EngineResult};
use crate::types::{EventId, NewVisit};
use crate::utils::current_timestamp_millis;

use super::{aggregate, MetricsEngine};

/// Record a visit for an entity and refresh its metrics
pub fn record_visit(
    engine: &MetricsEngine,
    entity_key: &str,
    visit: NewVisit,
) -> EngineResult<EventId> {
    validate_entity_key(entity_key)?;
    visit.validate()?;

    let entity_lock = engine
        .config
        .serialize_per_entity
        .then(|| engine.locks.lock_for(entity_key));
    let _guard = entity_lock.as_ref().map(|lock| lock.lock());

    let event = visit.into_event(current_timestamp_millis());
    let venue_id = event.venue_id.clone();
    let event_id = engine.store.append(entity_key, event)?;

    debug!(
        entity_key,
        event_id = %event_id,
        venue_id = %venue_id,
        "visit recorded"
    );

    match aggregate::recompute(engine, entity_key) {
        Ok(_) => Ok(event_id),
        Err(EngineError::StoreUnavailable(source)) => {
            warn!(
                entity_key,
                event_id = %event_id,
                error = %source,
                "visit recorded but metrics recompute failed"
            );
            Err(EngineError::MetricsStale { event_id, source })
        }
        Err(other) => Err(other),
    }
}
