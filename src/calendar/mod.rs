//! Week-window arithmetic for the reporting calendar.
//!
//! Weekday numbering follows the convention used throughout the tool's
//! configuration: `0 = Monday` through `6 = Sunday`.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use core::fmt;

/// A 7-day inclusive date range ending on a configured weekday.
///
/// Invariants: `end - start == 6 days`, and windows produced by
/// [`most_recent_completed_week`] lie entirely in the past relative to the
/// reference date they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// Iterate the window's days in order, from `start` through `end` inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl fmt::Display for WeekWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Full English name of a date's weekday, as written into the daily breakdown file.
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Compute the most recently completed week relative to `reference`.
///
/// Finds the most recent date at or before `reference` whose weekday equals
/// `week_end_day`. When that candidate is `reference` itself (today is the
/// week-end day, so the current week is still in progress) the window steps
/// back a full 7 days. The returned window is therefore always fully in the
/// past, never a partially-elapsed current week.
pub fn most_recent_completed_week(reference: NaiveDate, week_end_day: u8) -> WeekWindow {
    let days_since_end = (i64::from(reference.weekday().num_days_from_monday()) - i64::from(week_end_day)).rem_euclid(7);

    #[expect(clippy::cast_sign_loss, reason = "rem_euclid(7) is always in 0..7")]
    let mut end = reference - Days::new(days_since_end as u64);

    if end >= reference {
        end = end - Days::new(7);
    }

    WeekWindow {
        start: end - Days::new(6),
        end,
    }
}

/// Compute `count` contiguous, non-overlapping completed weeks ending at or
/// before the most recently completed one, in ascending chronological order
/// (oldest first).
///
/// Each window is re-derived from a reference stepped back by a 7-day
/// multiple, so consecutive windows tile exactly: window `i+1` starts the day
/// after window `i` ends.
pub fn n_preceding_weeks(reference: NaiveDate, count: usize, week_end_day: u8) -> Vec<WeekWindow> {
    let mut weeks: Vec<WeekWindow> = (0..count)
        .map(|i| most_recent_completed_week(reference - Days::new(7 * i as u64), week_end_day))
        .collect();

    weeks.reverse();
    weeks
}
