//! Query parameters and results for the read paths

use serde::{Deserialize, Serialize};

use super::{EventId, VisitEvent};

/// Inclusive bounds on `recordedAt`; `None` leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    /// Range with no bounds
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, recorded_at: i64) -> bool {
        self.start.map_or(true, |start| recorded_at >= start)
            && self.end.map_or(true, |end| recorded_at <= end)
    }
}

/// Options for an entity's visit history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Keep at most this many of the most recent matches (default 10)
    pub limit: Option<usize>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl HistoryQuery {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn between(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// Options for a venue-scoped scan across all entities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueQuery {
    /// Keep at most this many of the newest matches (default 100)
    pub limit: Option<usize>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl VenueQuery {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn between(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// A venue scan hit, tagged with the entity whose log it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueVisit {
    pub entity_key: String,
    pub event_id: EventId,
    pub event: VisitEvent,
}

/// Outcome of re-running recompute for every entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Entities whose snapshot was rewritten
    pub recomputed: usize,
    /// Entities whose recompute failed, with the error message
    pub failures: Vec<(String, String)>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_inclusive() {
        let range = TimeRange::new(Some(10), Some(20));
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
    }

    #[test]
    fn test_open_ranges() {
        assert!(TimeRange::all().contains(i64::MIN));
        assert!(TimeRange::new(Some(5), None).contains(i64::MAX));
        assert!(!TimeRange::new(None, Some(5)).contains(6));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let range = TimeRange::new(Some(20), Some(10));
        assert!(!range.contains(15));
    }
}
