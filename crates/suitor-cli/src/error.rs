//! CLI exit code handling.
//!
//! Exit codes:
//! - 0: success, one weight per capacity method on stdout
//! - 1: any failure (malformed input, bad configuration, IO); diagnostics
//!   go to stderr and nothing is printed to stdout for the failed sweep

use suitor_core::MatchError;

/// Exit codes for the sweep command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    /// Success: results on stdout.
    Success = 0,
    /// Failure before or during the sweep: diagnostics on stderr.
    Failure = 1,
}

impl From<CliExitCode> for i32 {
    fn from(code: CliExitCode) -> Self {
        code as i32
    }
}

impl From<&MatchError> for CliExitCode {
    fn from(err: &MatchError) -> Self {
        match err {
            MatchError::MalformedInput { .. }
            | MatchError::InvalidConfig(_)
            | MatchError::Io(_) => CliExitCode::Failure,
        }
    }
}
