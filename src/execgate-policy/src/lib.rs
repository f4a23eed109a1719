#![allow(clippy::missing_errors_doc, clippy::doc_markdown)]
//! Execgate Policy - static pre-exec gate for shell command vectors.
//!
//! Given a tokenised command, a working directory, a sandbox mode, a set
//! of writable roots and a network flag, decides whether the command may
//! run, without running it:
//! - `Allow` - the command may be started
//! - `Deny(reason)` - the command must not be started
//!
//! The gate is a best-effort heuristic filter in front of the real
//! isolation boundary, not the boundary itself. Unknown programs are
//! allowed.
//!
//! # Decision order
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │          argv + cwd + Profile              │
//! └────────────────────┬───────────────────────┘
//!                      ▼
//!        system-level tool? ──── yes ──► DENY (114)
//!                      │ no
//!                      ▼
//!          full-access mode? ──── yes ──► ALLOW
//!                      │ no
//!                      ▼
//!   read-only: any mutation?
//!   workspace-write: write outside roots? ── yes ──► DENY (114)
//!                      │ no
//!                      ▼
//!    network off and network intent? ── yes ──► DENY (113)
//!                      │ no
//!                      ▼
//!                    ALLOW
//! ```

#[cfg(test)]
mod tests;

mod advice;
mod boundary;
mod command;
mod decision;
mod detection;
mod error;
mod policy;
mod profile;
mod program;

// Re-export all public types
pub use advice::advise;
pub use boundary::{Containment, canonicalize_missing_ok, is_inside, normalize, resolve};
pub use command::Invocation;
pub use decision::{Decision, Denial, DenialKind, EXIT_CONTAINMENT_DENIED, EXIT_NETWORK_DENIED};
pub use detection::{
    is_network_intent, is_system_level_tool, looks_destructive_outside_project,
    read_only_violation,
};
pub use error::GateError;
pub use policy::{ExecGate, decide};
pub use profile::{
    DEFAULT_TEMP_ROOT, NetworkPolicy, Profile, SandboxMode, implicit_temp_roots,
    implicit_temp_roots_from,
};
pub use program::{ProgramKind, SYSTEM_TOOLS, basename};

/// Quick evaluation of a raw argv against a profile.
pub fn evaluate<S: AsRef<str>>(
    profile: &Profile,
    cwd: impl Into<std::path::PathBuf>,
    argv: &[S],
) -> Result<Decision, GateError> {
    let invocation = Invocation::from_args(cwd, argv)?;
    Ok(decide(profile, &invocation))
}
