//! Attack-count queries against the per-month SQLite databases.

mod monthly;

pub use monthly::{MonthCount, MonthlyDatabases};

use crate::calendar::WeekWindow;
use chrono::NaiveDate;

/// Source of attack counts for the report pipeline.
///
/// The production implementation reads the per-month SQLite databases; tests
/// substitute an in-memory fake. Lookups never fail: a month whose data
/// cannot be read contributes zero to the total.
pub trait AttackSource {
    /// Total attacks whose start date falls within `window`, inclusive.
    fn count_for_range(&self, window: &WeekWindow) -> u64;

    /// Attacks whose start date is exactly `date`.
    fn count_for_day(&self, date: NaiveDate) -> u64;
}
