use crate::Result;
use crate::attacks::AttackSource;
use crate::calendar::{WeekWindow, day_name};
use camino::Utf8Path;
use chrono::NaiveDate;
use log::info;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};

/// One calendar day of the most recent completed week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub day_name: String,
    pub attacks_count: u64,
}

/// Query the per-day counts for `window` and rewrite the daily breakdown
/// file wholesale. Unlike the trend store, this file carries no history:
/// every run regenerates all seven rows.
pub fn write_daily_breakdown(path: &Utf8Path, source: &dyn AttackSource, window: &WeekWindow) -> Result<Vec<DailyRow>> {
    let rows: Vec<DailyRow> = window
        .days()
        .map(|date| DailyRow {
            date,
            day_name: day_name(date).to_string(),
            attacks_count: source.count_for_day(date),
        })
        .collect();

    let mut writer = csv::Writer::from_path(path.as_std_path()).into_app_err_with(|| format!("creating daily breakdown {path}"))?;
    for row in &rows {
        writer
            .serialize(row)
            .into_app_err_with(|| format!("writing daily breakdown {path}"))?;
    }

    writer.flush().into_app_err_with(|| format!("flushing daily breakdown {path}"))?;

    info!("daily breakdown for week {window} written to {path}");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::most_recent_completed_week;
    use camino::Utf8PathBuf;
    use std::collections::HashMap;
    use std::fs;

    struct FakeSource(HashMap<NaiveDate, u64>);

    impl AttackSource for FakeSource {
        fn count_for_range(&self, window: &WeekWindow) -> u64 {
            window.days().map(|day| self.count_for_day(day)).sum()
        }

        fn count_for_day(&self, date: NaiveDate) -> u64 {
            self.0.get(&date).copied().unwrap_or(0)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_seven_rows_covering_the_window() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("daily_attacks_2024-03-10.csv")).expect("temp dir is not UTF-8");

        let window = most_recent_completed_week(date(2024, 3, 13), 6);
        let source = FakeSource([(date(2024, 3, 4), 2), (date(2024, 3, 10), 5)].into_iter().collect());

        let rows = write_daily_breakdown(&path, &source, &window).unwrap();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].date, window.start);
        assert_eq!(rows[0].day_name, "Monday");
        assert_eq!(rows[0].attacks_count, 2);
        assert_eq!(rows[6].date, window.end);
        assert_eq!(rows[6].day_name, "Sunday");
        assert_eq!(rows[6].attacks_count, 5);
    }

    #[test]
    fn test_file_is_regenerated_wholesale() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("daily_attacks.csv")).expect("temp dir is not UTF-8");

        let window = most_recent_completed_week(date(2024, 3, 13), 6);

        let _ = write_daily_breakdown(&path, &FakeSource([(date(2024, 3, 4), 9)].into_iter().collect()), &window).unwrap();
        let _ = write_daily_breakdown(&path, &FakeSource(HashMap::new()), &window).unwrap();

        let text = fs::read_to_string(path.as_std_path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("date,day_name,attacks_count"));
        assert_eq!(lines.count(), 7);
        assert!(!text.contains(",9"));
    }
}
