//! Metrics Aggregator
//!
//! Metrics are never updated field by field. Every recompute derives the whole
//! snapshot from the entity's complete log, so a torn or stale snapshot is
//! repaired by the next recompute.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::{validate_entity_key, EngineResult};
use crate::types::{Amount, MetricsSnapshot, RepairReport, VisitEvent};
use crate::utils::elapsed_months;

use super::MetricsEngine;

/// Derive a snapshot from a full visit history.
///
/// `events` must be in log order; venue ties go to the venue seen first.
pub fn compute_snapshot<'a, I>(events: I) -> MetricsSnapshot
where
    I: IntoIterator<Item = &'a VisitEvent>,
{
    let mut total_visits = 0u64;
    let mut total_spent = Amount::ZERO;
    let mut first_visit_at: Option<i64> = None;
    let mut last_visit_at: Option<i64> = None;

    // (venue, count) in first-seen order, with an index for lookups
    let mut venues: Vec<(&str, u64)> = Vec::new();
    let mut venue_index: HashMap<&str, usize> = HashMap::new();

    for event in events {
        total_visits += 1;
        total_spent = total_spent + event.amount_spent;

        let ts = event.recorded_at;
        first_visit_at = Some(first_visit_at.map_or(ts, |t| t.min(ts)));
        last_visit_at = Some(last_visit_at.map_or(ts, |t| t.max(ts)));

        let venue = event.venue_id.as_str();
        let idx = *venue_index.entry(venue).or_insert_with(|| {
            venues.push((venue, 0));
            venues.len() - 1
        });
        venues[idx].1 += 1;
    }

    let mut preferred_venue: Option<(&str, u64)> = None;
    for &(venue, count) in &venues {
        if preferred_venue.map_or(true, |(_, best)| count > best) {
            preferred_venue = Some((venue, count));
        }
    }

    let average_spend = if total_visits == 0 {
        0.0
    } else {
        total_spent.to_decimal() / total_visits as f64
    };

    let visit_frequency_per_month = match (first_visit_at, last_visit_at) {
        (Some(first), Some(last)) => total_visits as f64 / elapsed_months(first, last),
        _ => 0.0,
    };

    MetricsSnapshot {
        total_visits,
        total_spent,
        average_spend,
        first_visit_at,
        last_visit_at,
        visit_frequency_per_month,
        venue_frequency: venues
            .into_iter()
            .map(|(venue, count)| (venue.to_string(), count))
            .collect(),
        preferred_venue: preferred_venue.map(|(venue, _)| venue.to_string()),
    }
}

/// Recompute an entity's snapshot from its full log and store it
pub fn recompute(engine: &MetricsEngine, entity_key: &str) -> EngineResult<MetricsSnapshot> {
    validate_entity_key(entity_key)?;

    let events = engine.store.read_all(entity_key)?;
    let snapshot = compute_snapshot(events.values());
    engine.store.write_metrics(entity_key, &snapshot)?;

    debug!(
        entity_key,
        total_visits = snapshot.total_visits,
        total_spent = %snapshot.total_spent,
        "recomputed metrics"
    );

    Ok(snapshot)
}

/// Read an entity's cached snapshot without recomputing
pub fn get_metrics(
    engine: &MetricsEngine,
    entity_key: &str,
) -> EngineResult<Option<MetricsSnapshot>> {
    validate_entity_key(entity_key)?;
    Ok(engine.store.read_metrics(entity_key)?)
}

/// Re-run recompute for every entity in the store.
///
/// Individual failures are collected rather than aborting the run; only a
/// failure to enumerate entities is returned as an error.
pub fn recompute_all(engine: &MetricsEngine) -> EngineResult<RepairReport> {
    let mut report = RepairReport::default();

    for entity_key in engine.store.entity_keys()? {
        match recompute(engine, &entity_key) {
            Ok(_) => report.recomputed += 1,
            Err(e) => {
                warn!(entity_key = %entity_key, error = %e, "recompute failed");
                report.failures.push((entity_key, e.to_string()));
            }
        }
    }

    info!(
        recomputed = report.recomputed,
        failed = report.failures.len(),
        "metrics repair finished"
    );

    Ok(report)
}
