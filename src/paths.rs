//! Resolution of the on-disk layout under the base data directory.
//!
//! The base directory is an explicit configuration value threaded into every
//! component; nothing in the crate derives paths from the location of the
//! executable or the current working directory.

use camino::Utf8PathBuf;
use chrono::NaiveDate;

/// The directory layout rooted at the base data directory:
/// `database_files/<customer>/` for the per-month SQLite sources and
/// `report_files/<customer>/` for generated artifacts.
#[derive(Debug, Clone)]
pub struct Paths {
    base: Utf8PathBuf,
}

impl Paths {
    pub fn new(base: impl Into<Utf8PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Directory holding the per-month attack databases for a customer.
    pub fn database_dir(&self, customer_id: &str) -> Utf8PathBuf {
        self.base.join("database_files").join(customer_id)
    }

    /// Directory receiving the generated report artifacts for a customer.
    pub fn report_dir(&self, customer_id: &str) -> Utf8PathBuf {
        self.base.join("report_files").join(customer_id)
    }

    /// The rolling trend store for the week ending on `week_end`.
    pub fn trend_store(&self, customer_id: &str, week_end: NaiveDate) -> Utf8PathBuf {
        self.report_dir(customer_id).join(format!("weekly_trends_{week_end}.csv"))
    }

    /// The daily breakdown file for the week ending on `week_end`.
    pub fn daily_breakdown(&self, customer_id: &str, week_end: NaiveDate) -> Utf8PathBuf {
        self.report_dir(customer_id).join(format!("daily_attacks_{week_end}.csv"))
    }

    /// The HTML chart document for the week ending on `week_end`.
    pub fn chart_document(&self, customer_id: &str, week_end: NaiveDate) -> Utf8PathBuf {
        self.report_dir(customer_id).join(format!("weekly_trends_chart_{week_end}.html"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names_are_keyed_by_week_end() {
        let paths = Paths::new("/data");
        let week_end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        assert_eq!(
            paths.trend_store("EA", week_end),
            Utf8PathBuf::from("/data/report_files/EA/weekly_trends_2024-03-10.csv")
        );
        assert_eq!(
            paths.chart_document("EA", week_end),
            Utf8PathBuf::from("/data/report_files/EA/weekly_trends_chart_2024-03-10.html")
        );
        assert_eq!(
            paths.daily_breakdown("EA", week_end),
            Utf8PathBuf::from("/data/report_files/EA/daily_attacks_2024-03-10.csv")
        );
    }

    #[test]
    fn test_database_dir_is_per_customer() {
        let paths = Paths::new(".");
        assert_eq!(paths.database_dir("EA"), Utf8PathBuf::from("./database_files/EA"));
    }
}
