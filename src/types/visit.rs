//! Visit event types
//!
//! A `VisitEvent` is one guest interaction at a venue. Callers build a
//! `NewVisit`, which is validated before anything touches the store; the
//! recorder then stamps it with `recordedAt` to produce the immutable event.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::utils::{date_of_millis, is_calendar_date};

use super::Amount;

/// Store-generated identifier of an event within one entity's log.
///
/// Ids increase with insertion order and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    pub const fn new(seq: u64) -> Self {
        EventId(seq)
    }

    /// Position in the log, starting at 1
    pub const fn seq(self) -> u64 {
        self.0
    }

    /// The id that follows this one in the same log
    pub const fn next(self) -> Self {
        EventId(self.0 + 1)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:020}", self.0)
    }
}

fn default_quantity() -> u32 {
    1
}

/// One purchased item on a visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Amount,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Amount) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }
}

/// An immutable visit record in an entity's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitEvent {
    /// Calendar date of the visit (YYYY-MM-DD)
    pub date: String,
    pub venue_id: String,
    pub amount_spent: Amount,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_receipt_id: Option<String>,
    /// Epoch milliseconds assigned at write time; strictly increasing per entity
    pub recorded_at: i64,
}

/// An event together with the id the store assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVisit {
    pub id: EventId,
    #[serde(flatten)]
    pub event: VisitEvent,
}

impl StoredVisit {
    pub fn new(id: EventId, event: VisitEvent) -> Self {
        Self { id, event }
    }

    pub fn recorded_at(&self) -> i64 {
        self.event.recorded_at
    }
}

/// Caller-supplied visit payload, before validation and timestamping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVisit {
    /// Calendar date; defaults to the date of `recordedAt` when empty
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue_id: String,
    pub amount_spent: Amount,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub source_receipt_id: Option<String>,
}

impl NewVisit {
    pub fn new(venue_id: impl Into<String>, amount_spent: Amount) -> Self {
        Self {
            date: String::new(),
            venue_id: venue_id.into(),
            amount_spent,
            line_items: Vec::new(),
            source_receipt_id: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn with_source_receipt(mut self, receipt_id: impl Into<String>) -> Self {
        self.source_receipt_id = Some(receipt_id.into());
        self
    }

    /// Reject malformed input before it can reach the store
    pub fn validate(&self) -> EngineResult<()> {
        if self.venue_id.trim().is_empty() {
            return Err(EngineError::InvalidVisit("venueId is required".to_string()));
        }

        if self.amount_spent.is_negative() {
            return Err(EngineError::InvalidVisit(format!(
                "amountSpent must be non-negative, got {}",
                self.amount_spent
            )));
        }

        if !self.date.is_empty() && !is_calendar_date(&self.date) {
            return Err(EngineError::InvalidVisit(format!(
                "date must be a YYYY-MM-DD calendar date, got '{}'",
                self.date
            )));
        }

        for (idx, item) in self.line_items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(EngineError::InvalidVisit(format!(
                    "lineItems[{}] quantity must be at least 1",
                    idx
                )));
            }
            if item.unit_price.is_negative() {
                return Err(EngineError::InvalidVisit(format!(
                    "lineItems[{}] unitPrice must be non-negative",
                    idx
                )));
            }
        }

        if matches!(&self.source_receipt_id, Some(id) if id.trim().is_empty()) {
            return Err(EngineError::InvalidVisit(
                "sourceReceiptId must not be blank when present".to_string(),
            ));
        }

        Ok(())
    }

    /// Stamp the visit with its write-time timestamp
    pub(crate) fn into_event(self, recorded_at: i64) -> VisitEvent {
        let date = if self.date.is_empty() {
            date_of_millis(recorded_at)
        } else {
            self.date
        };

        VisitEvent {
            date,
            venue_id: self.venue_id,
            amount_spent: self.amount_spent,
            line_items: self.line_items,
            source_receipt_id: self.source_receipt_id,
            recorded_at,
        }
    }
}
