//! History Query

use crate::error::{validate_entity_key, EngineResult};
use crate::types::{HistoryQuery, StoredVisit};

use super::MetricsEngine;

/// An entity's visits within the query's time bounds, oldest first.
///
/// Bounds are inclusive and applied before the limit, and the limit keeps the
/// most recent matches. No events (or no matches) is an empty result.
pub fn get_history(
    engine: &MetricsEngine,
    entity_key: &str,
    query: HistoryQuery,
) -> EngineResult<Vec<StoredVisit>> {
    validate_entity_key(entity_key)?;

    let limit = query.limit.unwrap_or(engine.config.history_default_limit);
    Ok(engine
        .store
        .read_range(entity_key, query.range(), Some(limit))?)
}
