//! A tool that tracks weekly security-attack trends from per-month SQLite databases.
//!
//! # Overview
//!
//! `attack-trends` aggregates attack counts recorded in per-month SQLite
//! databases into a rolling per-week CSV trend file, renders the trend as a
//! static HTML chart, and optionally emails both artifacts to a configured
//! recipient list. Each invocation performs exactly one run; recurring
//! execution is left to an external scheduler such as cron.
//!
//! # Quick Start
//!
//! Generate a configuration file, then run the report:
//!
//! ```bash
//! attack-trends init
//! attack-trends report
//! ```
//!
//! This reads `trends.toml` from the current directory, refreshes the trend
//! store under `report_files/<customer>/`, writes the HTML chart next to it,
//! and emails both files if email is enabled.
//!
//! # Data Layout
//!
//! All data lives under a base directory (`--base-dir`, default `.`):
//!
//! ```text
//! <base>/
//!   database_files/<customer>/database_<customer>_<MM>_<YYYY>.sqlite
//!   report_files/<customer>/weekly_trends_<week-end>.csv
//!   report_files/<customer>/weekly_trends_chart_<week-end>.html
//!   report_files/<customer>/daily_attacks_<week-end>.csv
//! ```
//!
//! Each monthly database holds an `attacks` table with a `startDate` column.
//! A month whose database is missing or unreadable contributes zero attacks
//! to the totals; this is logged but never fails the run.
//!
//! # Reporting Weeks
//!
//! A reporting week is a 7-day window ending on the configured weekday
//! (`week_end_day`, 0 = Monday through 6 = Sunday). Every run refreshes the
//! most recently *completed* week — when today is itself the week-end day,
//! the still-elapsing week is skipped and the previous one is used. The
//! first run against a new store records the full configured history
//! (`retention_weeks` weeks); later runs re-derive only the latest week and
//! trim the store back to `retention_weeks` rows, so re-running within the
//! same week converges instead of duplicating rows.
//!
//! # Configuration
//!
//! Configuration is read from `trends.toml`, `trends.yml`, `trends.yaml`, or
//! `trends.json` in the base directory, or from an explicit `--config` path:
//!
//! ```toml
//! [report]
//! customer_id = "EA"
//! week_end_day = 6        # Sunday
//! retention_weeks = 6
//!
//! [email]
//! enabled = true
//! smtp_host = "smtp.example.com"
//! smtp_port = 587
//! username = "reports"
//! password = "secret"
//! from_address = "reports@example.com"
//! recipients = ["soc@example.com"]
//! use_tls = true
//! use_authentication = true
//! ```
//!
//! Use `attack-trends validate` to check a configuration and the expected
//! directory layout without generating anything.
//!
//! # Reproducible Runs
//!
//! The reference date used to derive the reporting weeks defaults to today.
//! It can be pinned, either for testing or for backfilling, with the
//! `reference_date` config field or the `--as-of` flag:
//!
//! ```bash
//! attack-trends report --as-of 2024-03-13 --no-email
//! ```
//!
//! # Scheduling
//!
//! A typical crontab entry running every Monday morning:
//!
//! ```text
//! 30 6 * * 1 attack-trends report --base-dir /srv/attack-reports
//! ```
//!
//! # Exit Codes
//!
//! - `0`: reports generated (even if email delivery failed; the failure is
//!   logged and the run is degraded, not aborted)
//! - non-zero: configuration error or report generation failure

use attack_trends::Result;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

mod commands;

use crate::commands::{InitArgs, ReportArgs, ValidateArgs, generate_report, init_config, validate_config};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "attack-trends", version, about)]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: TrendsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TrendsSubcommand {
    /// Generate the weekly attack trend reports and optionally email them
    Report(Box<ReportArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file and the data directory layout
    Validate(ValidateArgs),
}

fn main() -> Result<()> {
    match &Cli::parse().command {
        TrendsSubcommand::Report(report_args) => generate_report(report_args),
        TrendsSubcommand::Init(init_args) => init_config(init_args),
        TrendsSubcommand::Validate(validate_args) => validate_config(validate_args),
    }
}
