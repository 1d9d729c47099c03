//! Derived per-entity metrics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Amount;

/// Aggregate statistics derived from an entity's full visit history.
///
/// Always an exact function of the history it was computed from; it is a cache
/// entry that any recompute can rebuild, never a source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_visits: u64,
    pub total_spent: Amount,
    /// `total_spent / total_visits` in major units, 0 with no visits
    pub average_spend: f64,
    pub first_visit_at: Option<i64>,
    pub last_visit_at: Option<i64>,
    pub visit_frequency_per_month: f64,
    #[serde(default)]
    pub venue_frequency: BTreeMap<String, u64>,
    pub preferred_venue: Option<String>,
}

impl MetricsSnapshot {
    /// Snapshot of an entity with no visits
    pub fn empty() -> Self {
        Self::default()
    }

    /// Visits recorded at one venue
    pub fn visits_at(&self, venue_id: &str) -> u64 {
        self.venue_frequency.get(venue_id).copied().unwrap_or(0)
    }
}
