use std::fmt::{Display, Formatter};

use time::Date;

use crate::error::ValidationError;

/// Inclusive calendar-date range submitted as one fetch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Construct a range, rejecting `start > end`.
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of days between start and end (zero for a single-day range).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).whole_days()
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
