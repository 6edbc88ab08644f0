//! Console output gating
//!
//! Training emits one line per epoch at [`LogLevel::Normal`]; per-phase
//! detail such as checkpoint writes only appears at [`LogLevel::Verbose`].
//! Quiet suppresses everything, leaving errors on stderr as the only
//! output.

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// One line per epoch plus the run summary
    #[default]
    Normal,
    /// Additional per-phase detail
    Verbose,
}

impl LogLevel {
    /// Resolve the level from the global CLI flags; quiet wins.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }
}

/// Print `msg` if the selected `level` permits output at `required`.
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}
