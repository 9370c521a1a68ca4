use attack_trends::Result;
use attack_trends::config::Config;
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path
    #[arg(value_name = "PATH", default_value = "trends.toml")]
    pub output: Utf8PathBuf,
}

pub fn init_config(args: &InitArgs) -> Result<()> {
    Config::write_default(&args.output)?;
    println!("Generated default configuration file: {}", args.output);
    Ok(())
}
