//! Date-range window planner.
//!
//! The upstream history endpoint caps a single query at one year, so a
//! symbol's missing span is split into chronologically ordered, contiguous,
//! non-overlapping windows of at most [`MAX_WINDOW_DAYS`] days each.

use time::{Date, Duration};

use crate::domain::DateRange;

/// Maximum span of a single fetch window, imposed by the upstream service.
pub const MAX_WINDOW_DAYS: i64 = 365;

/// Split `[start, end]` into ordered fetch windows.
///
/// Pure, no failure modes. Concatenating the output reconstructs exactly
/// `[start, end]`: each window ends where `end` or the day cap dictates and
/// the next window starts the following day. `start >= end` yields an empty
/// plan — the symbol is already up to date.
pub fn plan(start: Date, end: Date) -> Vec<DateRange> {
    let mut windows = Vec::new();
    if start >= end {
        return windows;
    }

    let mut cursor = start;
    while cursor <= end {
        let window_end = cursor.saturating_add(Duration::days(MAX_WINDOW_DAYS)).min(end);
        windows.push(DateRange {
            start: cursor,
            end: window_end,
        });
        match window_end.next_day() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    windows
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn assert_covers(start: Date, end: Date, windows: &[DateRange]) {
        let first = windows.first().expect("plan must not be empty");
        let last = windows.last().expect("plan must not be empty");
        assert_eq!(first.start, start);
        assert_eq!(last.end, end);
        for window in windows {
            assert!(window.start <= window.end);
            assert!(window.span_days() <= MAX_WINDOW_DAYS);
        }
        for pair in windows.windows(2) {
            assert_eq!(
                pair[0].end.next_day().expect("next day exists"),
                pair[1].start,
                "windows must be contiguous without gaps or overlaps"
            );
        }
    }

    #[test]
    fn short_span_yields_single_window() {
        let start = date!(2024 - 01 - 01);
        let end = date!(2024 - 02 - 01);
        let windows = plan(start, end);
        assert_eq!(windows, vec![DateRange { start, end }]);
    }

    #[test]
    fn long_span_is_partitioned_contiguously() {
        let cases = [
            (date!(2014 - 11 - 03), date!(2024 - 11 - 03)),
            (date!(2020 - 02 - 28), date!(2021 - 03 - 01)),
            (date!(2023 - 01 - 01), date!(2024 - 01 - 02)),
        ];
        for (start, end) in cases {
            let windows = plan(start, end);
            assert_covers(start, end, &windows);
        }
    }

    #[test]
    fn ten_year_span_has_ten_windows() {
        let windows = plan(date!(2014 - 11 - 03), date!(2024 - 11 - 03));
        assert_eq!(windows.len(), 10);
    }

    #[test]
    fn equal_bounds_yield_empty_plan() {
        assert!(plan(date!(2024 - 05 - 01), date!(2024 - 05 - 01)).is_empty());
    }

    #[test]
    fn inverted_bounds_yield_empty_plan() {
        assert!(plan(date!(2024 - 05 - 02), date!(2024 - 05 - 01)).is_empty());
    }
}
