mod common;
mod init;
mod report;
mod validate;

pub use init::{InitArgs, init_config};
pub use report::{ReportArgs, generate_report};
pub use validate::{ValidateArgs, validate_config};
