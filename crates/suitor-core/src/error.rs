//! Error types for matching operations.
//!
//! The matching engines themselves have no failure paths: once a graph is
//! loaded and a configuration validated, a round is a closed, total
//! computation over in-memory state. Everything that can go wrong does so
//! at the boundaries (input parsing, configuration), so the taxonomy stays
//! small. Internal invariant violations are defects, not errors, and are
//! asserted in debug builds rather than surfaced here.

use thiserror::Error;

/// Result type alias for matching operations.
pub type MatchResult<T> = Result<T, MatchError>;

/// Errors surfaced by the graph loader and the engine configuration.
#[derive(Error, Debug)]
pub enum MatchError {
    /// An edge record could not be parsed. Fatal at load time, before any
    /// matching round runs.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number in the input file.
        line: usize,
        /// What failed to parse.
        reason: String,
    },

    /// Invalid engine or sweep configuration. Fatal before any work begins.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Underlying IO failure while reading the edge list.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
