use crate::Result;
use crate::attacks::AttackSource;
use crate::calendar::WeekWindow;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use log::info;
use ohno::{IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::fs;

/// One recorded week in the trend store.
///
/// The `(week_start, week_end)` pair is the row's identity; the count is
/// payload and may be overwritten by a later run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRow {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub attacks_count: u64,
}

impl TrendRow {
    fn matches(&self, window: &WeekWindow) -> bool {
        self.week_start == window.start && self.week_end == window.end
    }
}

/// Whether a row with `window`'s exact `(week_start, week_end)` key is present.
pub fn row_exists(rows: &[TrendRow], window: &WeekWindow) -> bool {
    rows.iter().any(|row| row.matches(window))
}

const HEADER: [&str; 3] = ["week_start", "week_end", "attacks_count"];

/// The rolling trend store: a CSV file holding one row per historical week,
/// bounded to the most recent `retention` weeks.
///
/// Rewrites are plain read-modify-write of the whole file; there is no
/// locking and no atomic-rename step, so concurrent invocations against the
/// same store file are unsupported.
#[derive(Debug)]
pub struct TrendStore {
    path: Utf8PathBuf,
}

impl TrendStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every row from the store, in the file's physical order.
    pub fn load(&self) -> Result<Vec<TrendRow>> {
        let mut reader =
            csv::Reader::from_path(self.path.as_std_path()).into_app_err_with(|| format!("opening trend store {}", self.path))?;

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record.into_app_err_with(|| format!("reading trend store {}", self.path))?);
        }

        Ok(rows)
    }

    /// Append a single row, creating the file (and its header) on first write.
    pub fn append(&self, row: &TrendRow) -> Result<()> {
        // The header goes in whenever the file has no content yet, not merely
        // when it is absent; a rewrite that evicted every row leaves an empty file
        let needs_header = fs::metadata(self.path.as_std_path()).map_or(true, |meta| meta.len() == 0);
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_std_path())
            .into_app_err_with(|| format!("opening trend store {} for append", self.path))?;

        let mut writer = csv::WriterBuilder::new().has_headers(needs_header).from_writer(file);
        writer
            .serialize(row)
            .into_app_err_with(|| format!("appending to trend store {}", self.path))?;
        writer
            .flush()
            .into_app_err_with(|| format!("flushing trend store {}", self.path))?;

        Ok(())
    }

    /// Replace the file's contents with exactly `rows`, header included.
    pub fn rewrite(&self, rows: &[TrendRow]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(self.path.as_std_path())
            .into_app_err_with(|| format!("rewriting trend store {}", self.path))?;

        writer
            .write_record(HEADER)
            .into_app_err_with(|| format!("rewriting trend store {}", self.path))?;

        for row in rows {
            writer
                .serialize(row)
                .into_app_err_with(|| format!("rewriting trend store {}", self.path))?;
        }

        writer
            .flush()
            .into_app_err_with(|| format!("flushing trend store {}", self.path))?;

        Ok(())
    }

    /// Bring the store up to date for the requested windows and return its
    /// rows in chronological order.
    ///
    /// An absent store is bootstrapped with every requested window. A present
    /// store only has its most recent window refreshed: an existing row for
    /// that window is discarded and replaced with a freshly queried count, so
    /// late-arriving records are picked up and a re-run within the same week
    /// converges to a single row instead of accumulating duplicates. The
    /// store is then trimmed to the `retention` most recent weeks.
    pub fn ensure_window_coverage(&self, source: &dyn AttackSource, windows: &[WeekWindow], retention: usize) -> Result<Vec<TrendRow>> {
        let Some(newest) = windows.last() else {
            bail!("no week windows requested for trend store {}", self.path);
        };

        if self.exists() {
            self.refresh_newest_week(source, newest)?;
            self.trim(retention)
        } else {
            self.bootstrap(source, windows)
        }
    }

    /// First-time creation: record every requested window, oldest first.
    fn bootstrap(&self, source: &dyn AttackSource, windows: &[WeekWindow]) -> Result<Vec<TrendRow>> {
        info!("trend store {} does not exist, recording {} weeks", self.path, windows.len());

        let mut rows = Vec::with_capacity(windows.len());
        for (i, window) in windows.iter().enumerate() {
            let attacks_count = source.count_for_range(window);
            info!("week {} of {}: {window}, {attacks_count} attacks", i + 1, windows.len());

            let row = TrendRow {
                week_start: window.start,
                week_end: window.end,
                attacks_count,
            };
            self.append(&row)?;
            rows.push(row);
        }

        Ok(rows)
    }

    /// Re-derive the single most recent week, trusting the fresh query over
    /// any stored row with the same key.
    fn refresh_newest_week(&self, source: &dyn AttackSource, newest: &WeekWindow) -> Result<()> {
        let mut rows = self.load()?;

        if row_exists(&rows, newest) {
            info!("week {newest} already recorded in {}, overwriting with fresh count", self.path);
            rows.retain(|row| !row.matches(newest));
            self.rewrite(&rows)?;
        } else {
            info!("week {newest} not yet recorded in {}, appending", self.path);
        }

        let attacks_count = source.count_for_range(newest);
        info!("week {newest}: {attacks_count} attacks");

        self.append(&TrendRow {
            week_start: newest.start,
            week_end: newest.end,
            attacks_count,
        })
    }

    /// Keep only the `retention` chronologically latest rows, rewriting the
    /// file in sorted order when anything is evicted. Returns the rows sorted
    /// ascending by `week_start` either way.
    fn trim(&self, retention: usize) -> Result<Vec<TrendRow>> {
        let mut rows = self.load()?;
        rows.sort_by_key(|row| row.week_start);

        if rows.len() > retention {
            rows = rows.split_off(rows.len() - retention);
            self.rewrite(&rows)?;
            info!("trimmed {} to the most recent {retention} weeks", self.path);
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::n_preceding_weeks;
    use chrono::Days;
    use std::collections::HashMap;

    /// In-memory attack source keyed by day.
    #[derive(Default)]
    struct FakeSource {
        by_day: HashMap<NaiveDate, u64>,
    }

    impl FakeSource {
        fn with_counts(counts: &[(NaiveDate, u64)]) -> Self {
            Self {
                by_day: counts.iter().copied().collect(),
            }
        }
    }

    impl AttackSource for FakeSource {
        fn count_for_range(&self, window: &WeekWindow) -> u64 {
            window.days().map(|day| self.count_for_day(day)).sum()
        }

        fn count_for_day(&self, date: NaiveDate) -> u64 {
            self.by_day.get(&date).copied().unwrap_or(0)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> TrendStore {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("weekly_trends_2024-03-10.csv")).expect("temp dir is not UTF-8");
        TrendStore::new(path)
    }

    fn windows() -> Vec<WeekWindow> {
        n_preceding_weeks(date(2024, 3, 13), 6, 6)
    }

    #[test]
    fn test_bootstrap_writes_all_windows_in_order() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::with_counts(&[(date(2024, 3, 5), 4), (date(2024, 2, 1), 2)]);

        let rows = store.ensure_window_coverage(&source, &windows(), 6).unwrap();

        assert_eq!(rows.len(), 6);
        assert!(rows.windows(2).all(|pair| pair[0].week_start < pair[1].week_start));
        assert_eq!(rows[5].week_end, date(2024, 3, 10));
        assert_eq!(rows[5].attacks_count, 4);

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, rows);
    }

    #[test]
    fn test_double_run_is_idempotent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::with_counts(&[(date(2024, 3, 5), 4)]);

        let first = store.ensure_window_coverage(&source, &windows(), 6).unwrap();
        let bytes_after_first = fs::read(store.path().as_std_path()).unwrap();

        let second = store.ensure_window_coverage(&source, &windows(), 6).unwrap();
        let bytes_after_second = fs::read(store.path().as_std_path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(bytes_after_first, bytes_after_second);
    }

    #[test]
    fn test_existing_row_is_overwritten_with_fresh_count() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);

        let source = FakeSource::with_counts(&[(date(2024, 3, 5), 4)]);
        let _ = store.ensure_window_coverage(&source, &windows(), 6).unwrap();

        // Late-arriving records change the count for the same week
        let source = FakeSource::with_counts(&[(date(2024, 3, 5), 4), (date(2024, 3, 9), 3)]);
        let rows = store.ensure_window_coverage(&source, &windows(), 6).unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5].attacks_count, 7);
        assert!(row_exists(&rows, &windows()[5]));
    }

    #[test]
    fn test_missing_newest_week_is_appended() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::default();

        // Bootstrap against an older reference, then run with a newer one
        let old_windows = n_preceding_weeks(date(2024, 3, 6), 6, 6);
        let _ = store.ensure_window_coverage(&source, &old_windows, 6).unwrap();

        let rows = store.ensure_window_coverage(&source, &windows(), 6).unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5].week_end, date(2024, 3, 10));
        // The oldest bootstrap week was evicted by the trim
        assert_eq!(rows[0].week_end, date(2024, 2, 4));
    }

    #[test]
    fn test_trim_keeps_latest_rows_only() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::default();

        let _ = store.ensure_window_coverage(&source, &windows(), 6).unwrap();
        let rows = store.ensure_window_coverage(&source, &windows(), 4).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].week_end, date(2024, 3, 10));
        assert_eq!(rows[0].week_start, date(2024, 2, 12));
        assert_eq!(store.load().unwrap().len(), 4);
    }

    #[test]
    fn test_trim_is_noop_at_or_below_retention() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::default();

        let _ = store.ensure_window_coverage(&source, &windows(), 6).unwrap();
        let before = fs::read(store.path().as_std_path()).unwrap();

        let rows = store.trim(10).unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(fs::read(store.path().as_std_path()).unwrap(), before);
    }

    #[test]
    fn test_single_row_store_survives_refresh() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::with_counts(&[(date(2024, 3, 5), 4)]);

        // With retention 1 a refresh evicts the only row before re-adding it
        let _ = store.ensure_window_coverage(&source, &windows(), 1).unwrap();
        let _ = store.ensure_window_coverage(&source, &windows(), 1).unwrap();
        let rows = store.ensure_window_coverage(&source, &windows(), 1).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attacks_count, 4);

        let text = fs::read_to_string(store.path().as_std_path()).unwrap();
        assert!(text.starts_with("week_start,week_end,attacks_count\n"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_row_key_excludes_count() {
        let window = windows()[5];
        let rows = vec![TrendRow {
            week_start: window.start,
            week_end: window.end,
            attacks_count: 99,
        }];

        assert!(row_exists(&rows, &window));

        let shifted = WeekWindow {
            start: window.start + Days::new(1),
            end: window.end + Days::new(1),
        };
        assert!(!row_exists(&rows, &shifted));
    }

    #[test]
    fn test_empty_window_list_is_rejected() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::default();

        assert!(store.ensure_window_coverage(&source, &[], 6).is_err());
    }

    #[test]
    fn test_store_file_format() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);
        let source = FakeSource::with_counts(&[(date(2024, 3, 5), 4)]);

        let _ = store.ensure_window_coverage(&source, &windows(), 6).unwrap();
        let text = fs::read_to_string(store.path().as_std_path()).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("week_start,week_end,attacks_count"));
        assert_eq!(lines.last(), Some("2024-03-04,2024-03-10,4"));
    }
}
