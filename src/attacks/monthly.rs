use crate::attacks::AttackSource;
use crate::calendar::WeekWindow;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use rusqlite::{Connection, OpenFlags};

/// Outcome of counting one month's database.
///
/// A month that cannot be counted is not an error for the overall query; it
/// contributes zero. The variants preserve the distinction between a database
/// that was never delivered and one that failed to answer, so the caller can
/// log them differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthCount {
    Counted(u64),
    MissingDatabase,
    QueryFailed(String),
}

impl MonthCount {
    fn contribution(&self) -> u64 {
        match self {
            Self::Counted(count) => *count,
            Self::MissingDatabase | Self::QueryFailed(_) => 0,
        }
    }
}

/// Attack counts backed by one SQLite database per `(customer, month, year)`.
///
/// Databases live in a single per-customer directory and are named
/// `database_<customer>_<MM>_<YYYY>.sqlite`. Each holds an `attacks` table
/// whose `startDate` column carries the attack's start timestamp.
#[derive(Debug)]
pub struct MonthlyDatabases {
    dir: Utf8PathBuf,
    customer_id: String,
}

impl MonthlyDatabases {
    pub fn new(dir: impl Into<Utf8PathBuf>, customer_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            customer_id: customer_id.into(),
        }
    }

    fn database_path(&self, year: i32, month: u32) -> Utf8PathBuf {
        self.dir.join(format!("database_{}_{month:02}_{year}.sqlite", self.customer_id))
    }

    /// Count attacks with a start date in `[from, to]` within a single month's database.
    pub fn count_month(&self, year: i32, month: u32, from: NaiveDate, to: NaiveDate) -> MonthCount {
        let path = self.database_path(year, month);
        if !path.exists() {
            return MonthCount::MissingDatabase;
        }

        match query_month(&path, from, to) {
            Ok(count) => MonthCount::Counted(count),
            Err(e) => MonthCount::QueryFailed(e.to_string()),
        }
    }

    fn log_and_sum(&self, outcomes: impl IntoIterator<Item = ((i32, u32), MonthCount)>) -> u64 {
        let mut total = 0;
        for ((year, month), outcome) in outcomes {
            match &outcome {
                MonthCount::Counted(count) => {
                    debug!("counted {count} attacks for {} in {month:02}/{year}", self.customer_id);
                }
                MonthCount::MissingDatabase => {
                    warn!(
                        "no attack database for {} in {month:02}/{year}, counting 0: {}",
                        self.customer_id,
                        self.database_path(year, month)
                    );
                }
                MonthCount::QueryFailed(reason) => {
                    warn!("query against {} failed, counting 0: {reason}", self.database_path(year, month));
                }
            }

            total += outcome.contribution();
        }

        total
    }
}

impl AttackSource for MonthlyDatabases {
    fn count_for_range(&self, window: &WeekWindow) -> u64 {
        let outcomes: Vec<_> = months_spanned(window)
            .into_iter()
            .map(|(year, month)| ((year, month), self.count_month(year, month, window.start, window.end)))
            .collect();

        self.log_and_sum(outcomes)
    }

    fn count_for_day(&self, date: NaiveDate) -> u64 {
        let key = (date.year(), date.month());
        let outcome = self.count_month(key.0, key.1, date, date);
        self.log_and_sum([(key, outcome)])
    }
}

/// Every distinct `(year, month)` the window's days span, in calendar order.
/// A week window covers at most two months.
fn months_spanned(window: &WeekWindow) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    for day in window.days() {
        let key = (day.year(), day.month());
        if !months.contains(&key) {
            months.push(key);
        }
    }

    months
}

fn query_month(path: &Utf8Path, from: NaiveDate, to: NaiveDate) -> rusqlite::Result<u64> {
    let conn = Connection::open_with_flags(path.as_std_path(), OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM attacks WHERE DATE(startDate) >= ?1 AND DATE(startDate) <= ?2",
        rusqlite::params![from.format("%Y-%m-%d").to_string(), to.format("%Y-%m-%d").to_string()],
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or(0))
}
