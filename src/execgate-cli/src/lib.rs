//! Gate wrapper library.
//!
//! Parses the gate's own arguments, builds the immutable profile and
//! invocation, asks the policy engine for a decision, and either execs the
//! command or exits with the denial's exit code.

mod args;
mod logging;
mod run_main;
mod runner;

pub use args::GateArgs;
pub use logging::{DEFAULT_LOG_FILTER, init_logging};
pub use run_main::{EXIT_USAGE, GateSetup, run, run_main};
pub use runner::{EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND};
