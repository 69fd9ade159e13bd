//! Finite, totally ordered sort keys.

use super::OrderingError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position of a column on its board or a task in its column.
///
/// Values are finite `f64`s so that an item can be placed strictly between
/// two neighbours without touching them. Negative zero is normalised to zero
/// so that equality and ordering agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SortOrder(pub(super) f64);

impl SortOrder {
    /// The order given to the first item of an empty list.
    pub const ZERO: Self = Self(0.0);

    /// Creates a sort order from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::NonFinite`] for NaN or infinite values.
    pub fn new(value: f64) -> Result<Self, OrderingError> {
        if !value.is_finite() {
            return Err(OrderingError::NonFinite);
        }
        #[expect(clippy::float_arithmetic, reason = "adding zero normalises -0.0")]
        let normalized = value + 0.0;
        Ok(Self(normalized))
    }

    /// Sort order for a zero-based list index.
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        Self(f64::from(index))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for SortOrder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortOrder {}

impl PartialOrd for SortOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for SortOrder {
    type Error = OrderingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SortOrder> for f64 {
    fn from(value: SortOrder) -> Self {
        value.0
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
