use attack_trends::Result;
use attack_trends::config::Config;
use attack_trends::paths::Paths;
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Base data directory containing database_files/ and report_files/
    #[arg(long, default_value = ".", value_name = "PATH")]
    pub base_dir: Utf8PathBuf,

    /// Path to configuration file [default: one of trends.[toml|yml|yaml|json] ]
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

#[expect(clippy::unnecessary_wraps, reason = "Consistent interface with other subcommands")]
pub fn validate_config(args: &ValidateArgs) -> Result<()> {
    match Config::load(&args.base_dir, args.config.as_ref()) {
        Ok((config, warnings)) => {
            println!("Configuration validation successful");
            if let Some(path) = &args.config {
                println!("Config file: {path}");
            } else {
                println!("Using default configuration search (trends.[toml|yml|yaml|json])");
            }

            // Print warnings if any
            if !warnings.is_empty() {
                eprintln!("\n⚠️  Configuration validation warnings:");
                for warning in &warnings {
                    eprintln!("   {warning}");
                }
                eprintln!();
            }

            // The layout checks are advisory; a fresh deployment legitimately
            // has no report_files directory yet
            let paths = Paths::new(args.base_dir.clone());
            for dir in [
                paths.database_dir(&config.report.customer_id),
                paths.report_dir(&config.report.customer_id),
            ] {
                if dir.exists() {
                    println!("✓ Directory exists: {dir}");
                } else {
                    println!("⚠️  Directory does not exist: {dir}");
                }
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {e}");
            std::process::exit(1);
        }
    }
}
