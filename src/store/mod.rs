//! The persisted trend store and the per-run daily breakdown file.

mod daily;
mod trend;

pub use daily::{DailyRow, write_daily_breakdown};
pub use trend::{TrendRow, TrendStore, row_exists};
