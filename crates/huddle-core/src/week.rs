//! Sunday-aligned week windows.
//!
//! Every path that reads or writes weekly availability anchors on the same
//! window calculation, so a personal calendar view and a group aggregation
//! for the same reference date always observe the same 7 dates.

use chrono::{Datelike, Duration, NaiveDate};

use crate::constants::DAYS_PER_WEEK;

/// The Sunday-to-Saturday span containing a reference date. Derived, never
/// persisted. Operates on calendar dates only, never on instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekWindow {
    start: NaiveDate,
}

impl WeekWindow {
    /// ## Summary
    /// Computes the window containing `date`: start is the Sunday on or
    /// before it.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let back = i64::from(date.weekday().num_days_from_sunday());
        Self {
            start: date - Duration::days(back),
        }
    }

    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// The Saturday closing the window.
    #[must_use]
    pub fn end(self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    /// The 7 consecutive dates of the window, Sunday first.
    #[must_use]
    pub fn days(self) -> [NaiveDate; DAYS_PER_WEEK] {
        let mut days = [self.start; DAYS_PER_WEEK];
        let mut current = self.start;
        for day in &mut days {
            *day = current;
            current += Duration::days(1);
        }
        days
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_is_always_sunday() {
        // One reference date per weekday of a known week.
        for d in 14..=20 {
            let window = WeekWindow::containing(date(2025, 12, d));
            assert_eq!(window.start().weekday(), Weekday::Sun);
            assert_eq!(window.start(), date(2025, 12, 14));
        }
    }

    #[test]
    fn test_sunday_maps_to_itself() {
        let sunday = date(2025, 12, 14);
        assert_eq!(WeekWindow::containing(sunday).start(), sunday);
    }

    #[test]
    fn test_days_are_seven_consecutive_dates() {
        let window = WeekWindow::containing(date(2025, 12, 16));
        let days = window.days();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], window.start());
        for pair in days.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        assert_eq!(days[6], window.end());
    }

    #[test]
    fn test_reference_date_falls_inside_its_window() {
        for d in [date(2024, 2, 29), date(2025, 1, 1), date(2025, 12, 31)] {
            assert!(WeekWindow::containing(d).contains(d));
        }
    }

    #[test]
    fn test_window_spans_month_boundary() {
        // 2025-12-31 is a Wednesday; its week runs Dec 28 through Jan 3.
        let window = WeekWindow::containing(date(2025, 12, 31));
        assert_eq!(window.start(), date(2025, 12, 28));
        assert_eq!(window.end(), date(2026, 1, 3));
    }

    #[test]
    fn test_contains_excludes_neighboring_weeks() {
        let window = WeekWindow::containing(date(2025, 12, 16));
        assert!(!window.contains(date(2025, 12, 13)));
        assert!(!window.contains(date(2025, 12, 21)));
    }
}
