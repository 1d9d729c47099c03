//! Utility functions and helpers
//!
//! Timestamp helpers and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write, atomic_write_with, cleanup_temp_files, AtomicError, AtomicResult};
pub use time::{
    current_timestamp_millis, date_of_millis, elapsed_months, is_calendar_date, next_recorded_at,
    MILLIS_PER_MONTH,
};
