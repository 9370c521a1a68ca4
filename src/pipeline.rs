//! The report pipeline: week derivation, counting, store update, rendering.

use crate::Result;
use crate::attacks::{AttackSource, MonthlyDatabases};
use crate::calendar::{self, WeekWindow};
use crate::config::ReportConfig;
use crate::paths::Paths;
use crate::reports;
use crate::store::{DailyRow, TrendRow, TrendStore, write_daily_breakdown};
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use log::info;
use ohno::IntoAppError;
use std::fs;

/// Title used for the HTML chart document.
const CHART_TITLE: &str = "Weekly Attack Trends";

/// Artifacts and rows produced by one report run.
#[derive(Debug)]
pub struct ReportOutcome {
    /// The most recently completed week the run refreshed.
    pub week: WeekWindow,
    pub trend: Vec<TrendRow>,
    pub daily: Vec<DailyRow>,
    pub trend_path: Utf8PathBuf,
    pub daily_path: Utf8PathBuf,
    pub chart_path: Utf8PathBuf,
}

/// Run the full report pipeline against the per-month databases under
/// `paths`, treating `reference` as "now".
pub fn generate_weekly_reports(report: &ReportConfig, paths: &Paths, reference: NaiveDate) -> Result<ReportOutcome> {
    let source = MonthlyDatabases::new(paths.database_dir(&report.customer_id), report.customer_id.clone());
    generate_weekly_reports_with(report, paths, reference, &source)
}

/// Pipeline body with the attack source as an explicit collaborator.
pub fn generate_weekly_reports_with(
    report: &ReportConfig,
    paths: &Paths,
    reference: NaiveDate,
    source: &dyn AttackSource,
) -> Result<ReportOutcome> {
    info!(
        "generating weekly reports for customer {} as of {reference} ({} weeks, week ends on day {})",
        report.customer_id, report.retention_weeks, report.week_end_day
    );

    let week = calendar::most_recent_completed_week(reference, report.week_end_day);
    let windows = calendar::n_preceding_weeks(reference, report.retention_weeks, report.week_end_day);

    let report_dir = paths.report_dir(&report.customer_id);
    fs::create_dir_all(report_dir.as_std_path()).into_app_err_with(|| format!("creating report directory {report_dir}"))?;

    let trend_path = paths.trend_store(&report.customer_id, week.end);
    let store = TrendStore::new(trend_path.clone());
    let trend = store.ensure_window_coverage(source, &windows, report.retention_weeks)?;

    let daily_path = paths.daily_breakdown(&report.customer_id, week.end);
    let daily = write_daily_breakdown(&daily_path, source, &week)?;

    let chart_path = paths.chart_document(&report.customer_id, week.end);
    let mut html = String::new();
    reports::generate_html(&trend, &daily, CHART_TITLE, &mut html)?;
    fs::write(chart_path.as_std_path(), html).into_app_err_with(|| format!("writing chart document {chart_path}"))?;

    info!("weekly trends report for week {week} completed");

    Ok(ReportOutcome {
        week,
        trend,
        daily,
        trend_path,
        daily_path,
        chart_path,
    })
}
