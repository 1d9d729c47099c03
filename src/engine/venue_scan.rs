//! Cross-Entity Scan
//!
//! There is no venue index: every entity's full log is read on each query, so
//! cost grows with entities x events per entity. Above
//! `parallel_scan_threshold` entities the logs are read on the rayon pool.

use rayon::prelude::*;
use tracing::debug;

use crate::error::EngineResult;
use crate::event_store::StoreResult;
use crate::types::{TimeRange, VenueQuery, VenueVisit};

use super::MetricsEngine;

/// Visits to one venue across all entities, newest first.
///
/// Note the order is the reverse of `get_history`.
pub fn get_venue_visits(
    engine: &MetricsEngine,
    venue_id: &str,
    query: VenueQuery,
) -> EngineResult<Vec<VenueVisit>> {
    let limit = query.limit.unwrap_or(engine.config.venue_default_limit);
    let range = query.range();
    let entity_keys = engine.store.entity_keys()?;

    let scan = |entity_key: &String| scan_entity(engine, entity_key, venue_id, range);

    let parallel = entity_keys.len() > engine.config.parallel_scan_threshold;
    let per_entity: Vec<Vec<VenueVisit>> = if parallel {
        entity_keys.par_iter().map(scan).collect::<StoreResult<_>>()?
    } else {
        entity_keys.iter().map(scan).collect::<StoreResult<_>>()?
    };

    let mut visits: Vec<VenueVisit> = per_entity.into_iter().flatten().collect();
    visits.sort_by(|a, b| b.event.recorded_at.cmp(&a.event.recorded_at));
    visits.truncate(limit);

    debug!(
        venue_id,
        entities = entity_keys.len(),
        parallel,
        returned = visits.len(),
        "venue scan finished"
    );

    Ok(visits)
}

fn scan_entity(
    engine: &MetricsEngine,
    entity_key: &str,
    venue_id: &str,
    range: TimeRange,
) -> StoreResult<Vec<VenueVisit>> {
    Ok(engine
        .store
        .read_all(entity_key)?
        .into_iter()
        .filter(|(_, event)| event.venue_id == venue_id && range.contains(event.recorded_at))
        .map(|(event_id, event)| VenueVisit {
            entity_key: entity_key.to_string(),
            event_id,
            event,
        })
        .collect())
}
