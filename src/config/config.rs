use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDate, NaiveDateTime};
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Filenames probed, in order, when no explicit `--config` path is given.
const DEFAULT_CONFIG_NAMES: [&str; 4] = ["trends.toml", "trends.yml", "trends.yaml", "trends.json"];

/// Timestamp format accepted for the `reference_date` override.
const REFERENCE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn default_customer_id() -> String {
    "EA".to_string()
}

const fn default_week_end_day() -> u8 {
    6 // Sunday
}

const fn default_retention_weeks() -> usize {
    6
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_subject_template() -> String {
    "Weekly Attack Trends Report - {customer_id} - Week Ending {week_end_date}".to_string()
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub email: EmailConfig,
}

/// Core report settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Customer identifier used in file and directory names.
    #[serde(default = "default_customer_id")]
    pub customer_id: String,

    /// Weekday on which a reporting week ends: 0 = Monday through 6 = Sunday.
    #[serde(default = "default_week_end_day")]
    pub week_end_day: u8,

    /// Number of most-recent weeks kept in the trend store.
    #[serde(default = "default_retention_weeks")]
    pub retention_weeks: usize,

    /// Optional reference-date override (`YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`);
    /// when absent the current date is used.
    #[serde(default)]
    pub reference_date: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            customer_id: default_customer_id(),
            week_end_day: default_week_end_day(),
            retention_weeks: default_retention_weeks(),
            reference_date: None,
        }
    }
}

impl ReportConfig {
    /// Parse the configured reference-date override, if any. An unparsable
    /// value is reported as a validation warning rather than an error, and
    /// the caller falls back to the current date.
    pub fn parsed_reference_date(&self) -> Option<NaiveDate> {
        let text = self.reference_date.as_deref()?;

        NaiveDateTime::parse_from_str(text, REFERENCE_DATE_FORMAT)
            .map(|dt| dt.date())
            .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
            .ok()
    }
}

/// Mail delivery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// Whether the report run attempts to email the generated artifacts.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub from_address: String,

    #[serde(default)]
    pub recipients: Vec<String>,

    /// Subject line template; `{customer_id}` and `{week_end_date}` are
    /// replaced at send time.
    #[serde(default = "default_subject_template")]
    pub subject_template: String,

    #[serde(default = "default_true")]
    pub use_tls: bool,

    #[serde(default = "default_true")]
    pub use_authentication: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: String::new(),
            recipients: Vec::new(),
            subject_template: default_subject_template(),
            use_tls: true,
            use_authentication: true,
        }
    }
}

impl EmailConfig {
    /// Expand the subject template for a concrete customer and week.
    pub fn subject(&self, customer_id: &str, week_end: NaiveDate) -> String {
        self.subject_template
            .replace("{customer_id}", customer_id)
            .replace("{week_end_date}", &week_end.to_string())
    }
}

impl Config {
    /// Load configuration from an explicit path, or from the first of
    /// `trends.[toml|yml|yaml|json]` found in `base_path`, or fall back to
    /// the built-in defaults when no file exists.
    ///
    /// Returns the configuration together with any non-fatal validation
    /// warnings. Malformed content, an unknown extension, or an out-of-range
    /// core value is an error.
    pub fn load(base_path: &Utf8Path, explicit: Option<&Utf8PathBuf>) -> Result<(Self, Vec<String>)> {
        let path = match explicit {
            Some(p) => Some(p.clone()),
            None => Self::find_default(base_path),
        };

        let Some(final_path) = path else {
            let config = Self::default();
            let mut warnings = Vec::new();
            config.validate(&mut warnings);
            return Ok((config, warnings));
        };

        let text = fs::read_to_string(&final_path).into_app_err_with(|| format!("reading configuration from {final_path}"))?;
        let extension = final_path.extension().unwrap_or_default();

        let config: Self = match extension {
            "toml" => toml::from_str(&text).into_app_err_with(|| format!("parsing TOML configuration from {final_path}"))?,
            "yml" | "yaml" => serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing YAML configuration from {final_path}"))?,
            "json" => serde_json::from_str(&text).into_app_err_with(|| format!("parsing JSON configuration from {final_path}"))?,
            _ => return Err(app_err!("unsupported configuration file extension: {extension}")),
        };

        config.ensure_valid()?;

        let mut warnings = Vec::new();
        config.validate(&mut warnings);
        Ok((config, warnings))
    }

    /// Save configuration to a file, with the format chosen by extension.
    pub fn save(&self, output_path: &Utf8Path) -> Result<()> {
        let extension = output_path.extension().unwrap_or_default();
        let text = match extension {
            "toml" => {
                toml::to_string_pretty(self).into_app_err_with(|| format!("serializing configuration to TOML for saving to {output_path}"))?
            }
            "yml" | "yaml" => {
                serde_yaml::to_string(self).into_app_err_with(|| format!("serializing configuration to YAML for saving to {output_path}"))?
            }
            "json" => serde_json::to_string_pretty(self)
                .into_app_err_with(|| format!("serializing configuration to JSON for saving to {output_path}"))?,
            _ => return Err(app_err!("unsupported configuration file extension: {extension}")),
        };

        fs::write(output_path, text).into_app_err_with(|| format!("writing configuration to {output_path}"))?;
        Ok(())
    }

    /// Write the default configuration. TOML output preserves the commented
    /// template; other formats serialize the default values.
    pub fn write_default(output_path: &Utf8Path) -> Result<()> {
        if output_path.extension() == Some("toml") {
            fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing configuration to {output_path}"))?;
            Ok(())
        } else {
            Self::default().save(output_path)
        }
    }

    fn find_default(base_path: &Utf8Path) -> Option<Utf8PathBuf> {
        DEFAULT_CONFIG_NAMES.iter().map(|name| base_path.join(name)).find(|p| p.exists())
    }

    /// Checks that make the configuration unusable; these fail the load.
    fn ensure_valid(&self) -> Result<()> {
        if self.report.week_end_day > 6 {
            return Err(app_err!(
                "week_end_day must be between 0 (Monday) and 6 (Sunday), got {}",
                self.report.week_end_day
            ));
        }

        if self.report.retention_weeks == 0 {
            return Err(app_err!("retention_weeks must be at least 1"));
        }

        if self.report.customer_id.is_empty() {
            return Err(app_err!("customer_id must not be empty"));
        }

        Ok(())
    }

    /// Collect non-fatal validation warnings.
    pub fn validate(&self, warnings: &mut Vec<String>) {
        if self.report.reference_date.is_some() && self.report.parsed_reference_date().is_none() {
            warnings.push(format!(
                "reference_date {:?} is not in `{REFERENCE_DATE_FORMAT}` or `%Y-%m-%d` format and will be ignored",
                self.report.reference_date.as_deref().unwrap_or_default()
            ));
        }

        if self.email.enabled {
            if self.email.recipients.is_empty() {
                warnings.push("email is enabled but no recipients are configured".to_string());
            }

            if self.email.from_address.is_empty() {
                warnings.push("email is enabled but from_address is empty".to_string());
            }

            if self.email.use_authentication && (self.email.username.is_empty() || self.email.password.is_empty()) {
                warnings.push("email authentication is enabled but username or password is empty".to_string());
            }
        }
    }
}
