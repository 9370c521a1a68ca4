//! Email delivery of the generated report artifacts.

use crate::Result;
use crate::config::EmailConfig;
use camino::Utf8Path;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{debug, info};
use ohno::{IntoAppError, bail};
use std::fs;

/// Send the weekly report email with the CSV and HTML artifacts attached.
///
/// Both artifacts are addressed by their deterministic names under
/// `report_dir`; a missing file is a precondition failure and no delivery is
/// attempted. Transport and authentication failures surface as errors too —
/// the caller decides whether they fail the run.
pub fn send_weekly_email(customer_id: &str, week_end: NaiveDate, email: &EmailConfig, report_dir: &Utf8Path) -> Result<()> {
    let csv_name = format!("weekly_trends_{week_end}.csv");
    let html_name = format!("weekly_trends_chart_{week_end}.html");
    let csv_path = report_dir.join(&csv_name);
    let html_path = report_dir.join(&html_name);

    if !csv_path.exists() {
        bail!("cannot send report email, CSV attachment is missing: {csv_path}");
    }

    if !html_path.exists() {
        bail!("cannot send report email, HTML attachment is missing: {html_path}");
    }

    if email.recipients.is_empty() {
        bail!("cannot send report email, no recipients are configured");
    }

    let message = build_message(customer_id, week_end, email, &csv_name, &csv_path, &html_name, &html_path)?;
    let transport = build_transport(email)?;

    info!("sending report email via {}:{}", email.smtp_host, email.smtp_port);
    let _ = transport
        .send(&message)
        .into_app_err_with(|| format!("sending report email via {}:{}", email.smtp_host, email.smtp_port))?;

    info!("report email sent to {}", email.recipients.join(", "));
    Ok(())
}

fn build_message(
    customer_id: &str,
    week_end: NaiveDate,
    email: &EmailConfig,
    csv_name: &str,
    csv_path: &Utf8Path,
    html_name: &str,
    html_path: &Utf8Path,
) -> Result<Message> {
    let from: Mailbox = email
        .from_address
        .parse::<Mailbox>()
        .into_app_err_with(|| format!("parsing from_address {:?}", email.from_address))?;

    let mut builder = Message::builder().from(from).subject(email.subject(customer_id, week_end));
    for recipient in &email.recipients {
        let to: Mailbox = recipient
            .parse::<Mailbox>()
            .into_app_err_with(|| format!("parsing recipient address {recipient:?}"))?;
        builder = builder.to(to);
    }

    let body = format!(
        "{customer_id}: Weekly Attack Trends Report\n\
         \n\
         Week End Date: {week_end}\n\
         \n\
         Please find attached:\n\
         - CSV data file: {csv_name}\n\
         - HTML chart file: {html_name}\n\
         \n\
         Best regards,\n\
         Automated Reporting System\n"
    );

    let octet_stream = ContentType::parse("application/octet-stream").into_app_err("parsing attachment content type")?;

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(csv_name.to_string()).body(read_attachment(csv_path)?, octet_stream.clone()))
                .singlepart(Attachment::new(html_name.to_string()).body(read_attachment(html_path)?, octet_stream)),
        )
        .into_app_err("assembling report email")
}

fn read_attachment(path: &Utf8Path) -> Result<Vec<u8>> {
    debug!("attaching {path}");
    fs::read(path.as_std_path()).into_app_err_with(|| format!("reading attachment {path}"))
}

fn build_transport(email: &EmailConfig) -> Result<SmtpTransport> {
    let mut builder = if email.use_tls {
        SmtpTransport::starttls_relay(&email.smtp_host)
            .into_app_err_with(|| format!("configuring STARTTLS for {}", email.smtp_host))?
    } else {
        debug!("TLS disabled for {}", email.smtp_host);
        SmtpTransport::builder_dangerous(&email.smtp_host)
    };

    builder = builder.port(email.smtp_port);

    if email.use_authentication {
        builder = builder.credentials(Credentials::new(email.username.clone(), email.password.clone()));
    } else {
        debug!("SMTP authentication disabled");
    }

    Ok(builder.build())
}
