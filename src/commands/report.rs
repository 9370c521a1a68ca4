use crate::commands::common::{Common, CommonArgs};
use attack_trends::pipeline::generate_weekly_reports;
use attack_trends::{Result, notify, reports};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Reference date override (YYYY-MM-DD) [default: today]
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Generate the reports without sending email
    #[arg(long)]
    pub no_email: bool,
}

pub fn generate_report(args: &ReportArgs) -> Result<()> {
    let common = Common::new(&args.common)?;
    let report = &common.config.report;

    // Precedence: command line, then config override, then the clock
    let reference = args
        .as_of
        .or_else(|| report.parsed_reference_date())
        .unwrap_or_else(|| Local::now().date_naive());

    let outcome = generate_weekly_reports(report, &common.paths, reference)?;

    let mut summary = String::new();
    reports::generate_console(&outcome.trend, &outcome.daily, common.color.enabled(), &mut summary)?;
    print!("{summary}");

    if args.no_email {
        info!("email sending disabled on the command line");
    } else if !common.config.email.enabled {
        info!("email sending disabled in the configuration");
    } else {
        let report_dir = common.paths.report_dir(&report.customer_id);

        // A failed delivery degrades the run; the reports themselves are done
        if let Err(e) = notify::send_weekly_email(&report.customer_id, outcome.week.end, &common.config.email, &report_dir) {
            warn!("email delivery failed, reports were still generated: {e}");
        }
    }

    Ok(())
}
