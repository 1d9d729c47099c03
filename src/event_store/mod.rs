//! Event Store Adapter
//!
//! This module abstracts the persistent backing store behind `VisitStore`:
//! - `VisitStore`: the append / read / range / metrics contract
//! - `MemoryStore`: in-process backend for tests and embedding
//! - `FileStore`: append-only JSONL logs with atomically replaced snapshots
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────────┐    ┌──────────────────┐    ┌─────────────────────┐
//! │ record_visit│───►│ append to entity │───►│ recompute + replace │
//! │             │    │ events.jsonl     │    │ metrics.json        │
//! └─────────────┘    └──────────────────┘    └─────────────────────┘
//!
//! Read Paths (never write):
//! ┌─────────────┐    ┌──────────────────────┐
//! │ get_history │───►│ read_range on entity │
//! └─────────────┘    └──────────────────────┘
//! ┌─────────────────┐    ┌──────────────────────────────────┐
//! │ get_venue_visits│───►│ entity_keys + read_all per entity│
//! └─────────────────┘    └──────────────────────────────────┘
//! ```

mod file;
mod memory;
mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{StoreError, StoreResult, VisitStore};
