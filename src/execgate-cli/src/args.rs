//! Command line arguments for the gate.

use std::path::PathBuf;

use clap::Parser;
use execgate_policy::{NetworkPolicy, SandboxMode};

/// Command line arguments for the gate wrapper.
///
/// Unknown flags are rejected; everything after the first bare `--` is the
/// literal command vector.
#[derive(Debug, Parser)]
#[command(
    name = "gate",
    version,
    about = "Static policy gate in front of a shell command"
)]
pub struct GateArgs {
    /// Working directory for the command (default: current directory).
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Writable root; may be repeated. `/tmp` and `$TMPDIR` are always added.
    #[arg(long = "writable", value_name = "PATH")]
    pub writable: Vec<PathBuf>,

    /// Network policy for the command. Only taken from the command line.
    #[arg(long, value_name = "on|off", default_value = "off")]
    pub network: NetworkPolicy,

    /// Sandbox mode: what the command may modify.
    #[arg(
        long,
        value_name = "read-only|workspace-write|full-access",
        default_value = "workspace-write"
    )]
    pub mode: SandboxMode,

    /// Log filter directive, e.g. `debug` or `execgate_policy=trace`.
    #[arg(long, value_name = "FILTER", env = "GATE_LOG")]
    pub log_level: Option<String>,

    /// Evaluate the policy but do not start the command.
    #[arg(long)]
    pub dry_run: bool,

    /// Command and arguments to execute.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
