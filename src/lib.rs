//! Guest Metrics Engine
//!
//! An append-only per-guest visit log with derived metrics that are
//! recomputed from the full history on every write, plus read paths for an
//! entity's recent history and for venue-scoped scans across all guests.
//!
//! # Modules
//!
//! - `types`: Visit events, money amounts, metrics snapshots, query options
//! - `event_store`: The `VisitStore` adapter contract and its backends
//! - `engine`: Visit recording, metrics aggregation, history and venue queries
//! - `config`: Engine configuration (defaults and environment)
//! - `error`: Engine error taxonomy
//! - `utils`: Timestamps and atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use guest_metrics::{Amount, HistoryQuery, MetricsEngine, NewVisit, VenueQuery};
//!
//! fn main() -> guest_metrics::EngineResult<()> {
//!     let engine = MetricsEngine::in_memory();
//!
//!     let spent = Amount::from_minor(1850);
//!     engine.record_visit("guest-42", NewVisit::new("downtown", spent))?;
//!
//!     let metrics = engine.recompute("guest-42")?;
//!     println!("{} visits, {} spent", metrics.total_visits, metrics.total_spent);
//!
//!     let recent = engine.get_history("guest-42", HistoryQuery::default())?;
//!     let venue = engine.get_venue_visits("downtown", VenueQuery::default().with_limit(5))?;
//!     println!("{} recent, {} at venue", recent.len(), venue.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod event_store;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::EngineConfig;
pub use engine::{compute_snapshot, MetricsEngine};
pub use error::{EngineError, EngineResult};
pub use event_store::{FileStore, MemoryStore, StoreError, StoreResult, VisitStore};
pub use types::{
    Amount, EventId, HistoryQuery, LineItem, MetricsSnapshot, NewVisit, RepairReport,
    StoredVisit, TimeRange, VenueQuery, VenueVisit, VisitEvent,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
