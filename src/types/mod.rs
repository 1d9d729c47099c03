//! Data types for the guest metrics engine
//!
//! This module contains the records stored in and derived from the visit log.

mod amount;
mod metrics;
mod query;
mod visit;

pub use amount::{Amount, ParseAmountError, MINOR_UNITS};
pub use metrics::MetricsSnapshot;
pub use query::{HistoryQuery, RepairReport, TimeRange, VenueQuery, VenueVisit};
pub use visit::{EventId, LineItem, NewVisit, StoredVisit, VisitEvent};

/// Keep only the last `limit` items of an ascending sequence
pub fn tail_limit<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    if items.len() > limit {
        items.drain(..items.len() - limit);
    }
    items
}
