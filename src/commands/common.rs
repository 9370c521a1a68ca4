//! Common processing logic shared between subcommands.

use attack_trends::Result;
use attack_trends::config::Config;
use attack_trends::misc::ColorMode;
use attack_trends::paths::Paths;
use camino::Utf8PathBuf;
use clap::Args;
use clap::ValueEnum;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning, and error messages
    Info,
    /// Debug and above messages
    Debug,
    /// All messages including trace
    Trace,
}

/// Common arguments shared between subcommands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Base data directory containing database_files/ and report_files/
    #[arg(long, default_value = ".", value_name = "PATH")]
    pub base_dir: Utf8PathBuf,

    /// Path to configuration file [default: one of trends.[toml|yml|yaml|json] ]
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

pub struct Common {
    pub config: Config,
    pub paths: Paths,
    pub color: ColorMode,
}

impl Common {
    /// Create a new Common processor with logger, config, and resolved paths
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded
    pub fn new(args: &CommonArgs) -> Result<Self> {
        Self::init_logging(args.log_level);

        let (config, warnings) = Config::load(&args.base_dir, args.config.as_ref())?;

        // Print warnings if any
        if !warnings.is_empty() {
            eprintln!("\n⚠️  Configuration validation warnings:");
            for warning in &warnings {
                eprintln!("   {warning}");
            }
            eprintln!();
        }

        Ok(Self {
            config,
            paths: Paths::new(args.base_dir.clone()),
            color: args.color,
        })
    }

    /// Initialize logger based on log level
    fn init_logging(log_level: LogLevel) {
        if log_level == LogLevel::None {
            return;
        }

        let level = match log_level {
            LogLevel::None => return, // Already checked above, but being explicit
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };

        let env = env_logger::Env::default().filter_or("RUST_LOG", level);

        env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(matches!(log_level, LogLevel::Debug) || matches!(log_level, LogLevel::Trace))
            .init();
    }
}
