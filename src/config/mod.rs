//! Typed run configuration.

#[expect(clippy::module_inception, reason = "Matches the module layout of the rest of the crate")]
mod config;

pub use config::{Config, DEFAULT_CONFIG_TOML, EmailConfig, ReportConfig};
