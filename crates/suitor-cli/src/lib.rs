//! Library surface of the suitor CLI.
//!
//! The binary in `main.rs` is a thin shell over these modules so the sweep
//! driver and exit-code mapping stay testable.

pub mod capacity;
pub mod error;
pub mod run;

pub use error::CliExitCode;
pub use run::{execute_sweep, Sweep};
