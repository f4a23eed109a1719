//! Error types for the policy gate.

use thiserror::Error;

/// Errors raised while building a profile or an invocation.
///
/// These are usage errors, not policy denials: a denial is a
/// [`Decision`](crate::Decision), never an `Err`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    /// The command vector was empty.
    #[error("no command specified")]
    EmptyCommand,

    /// A path could not be turned into an absolute path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Unrecognised network policy value.
    #[error("invalid network policy '{0}' (expected 'on' or 'off')")]
    InvalidNetworkPolicy(String),

    /// Unrecognised sandbox mode value.
    #[error("invalid sandbox mode '{0}' (expected 'read-only', 'workspace-write' or 'full-access')")]
    InvalidSandboxMode(String),
}
