//! Small shared helpers.

use clap::ValueEnum;
use std::io::{IsTerminal, stdout};

/// Controls when console output is colorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Colorize when writing to a terminal
    Auto,
    /// Always colorize
    Always,
    /// Never colorize
    Never,
}

impl ColorMode {
    /// Whether color codes should be emitted for standard output.
    pub fn enabled(self) -> bool {
        match self {
            Self::Auto => stdout().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_modes() {
        assert!(ColorMode::Always.enabled());
        assert!(!ColorMode::Never.enabled());
    }
}
