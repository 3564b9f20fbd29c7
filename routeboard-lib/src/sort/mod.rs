//! Custom sort core.
//!
//! A user reorders a list of rows by typing integer positions next to them. Positions may be left
//! blank or repeated. [`resolve`] turns that partial input into a total order and
//! [`find_duplicates`] reports the positions claimed more than once. Both are pure functions over
//! a snapshot of the rows and never fail.

use derive_more::{AsRef, Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::schedule::{DeliveryDays, DeliveryMode};

mod duplicates;
mod natural;
mod resolver;

pub use duplicates::{Duplicate, find_duplicates};
pub use natural::{natural_cmp, parse_custom_order};
pub use resolver::resolve;

/// Opaque identifier of an orderable record, stable for the lifetime of the record.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Deref, AsRef, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RowId(String);

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A snapshot of one orderable record, a location or a gallery row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: RowId,
    /// Short business facing identifier. Expected to be unique but not enforced.
    pub code: String,
    /// Human readable description
    pub label: String,
    /// Absent means daily
    pub delivery_mode: Option<DeliveryMode>,
    /// Weekdays the row is limited to, if any
    pub delivery_days: Option<DeliveryDays>,
}

impl Row {
    pub fn new(id: impl Into<RowId>, code: &str, label: &str) -> Self {
        Self {
            id: id.into(),
            code: code.to_string(),
            label: label.to_string(),
            delivery_mode: None,
            delivery_days: None,
        }
    }

    pub fn with_delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = Some(mode);
        self
    }

    pub fn with_delivery_days(mut self, days: DeliveryDays) -> Self {
        self.delivery_days = Some(days);
        self
    }
}

/// Position requested for a single row. `None` means the row should be placed automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortEntry {
    pub id: RowId,
    pub custom_order: Option<i64>,
}

impl SortEntry {
    pub fn new(id: impl Into<RowId>, custom_order: Option<i64>) -> Self {
        Self {
            id: id.into(),
            custom_order,
        }
    }
}

/// Build the default working set for `rows`: every row keeps its current position, counted from 1.
pub fn initial_entries(rows: &[Row]) -> Vec<SortEntry> {
    rows.iter()
        .zip(1_i64..)
        .map(|(row, order)| SortEntry::new(row.id.clone(), Some(order)))
        .collect()
}
