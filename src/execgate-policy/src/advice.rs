//! Non-blocking advisories for commands the gate allows.
//!
//! An advisory never changes a [`Decision`](crate::Decision). It flags
//! commands that passed the policy but will probably fail under the
//! profile, so the caller can tell a policy-induced failure apart from a
//! genuine one.

use crate::command::Invocation;
use crate::profile::{NetworkPolicy, Profile, SandboxMode};
use crate::program::ProgramKind;

/// Programs that always need a network peer.
const REMOTE_PROGRAMS: &[&str] = &["ssh", "scp", "sftp", "nc", "netcat", "telnet", "ftp"];

/// `cargo` subcommands that talk to a registry.
const CARGO_NETWORK_SUBCOMMANDS: &[&str] = &["fetch", "update", "publish", "search"];

/// Interpreters and build drivers that usually write output files.
const BUILD_TOOLS: &[&str] = &[
    "make", "cmake", "ninja", "go", "gradle", "mvn", "python", "python3", "node",
];

/// Returns a hint when an allowed command is likely to be hampered by the
/// profile.
pub fn advise(profile: &Profile, invocation: &Invocation) -> Option<String> {
    let prog = invocation.program_basename();

    match profile.mode() {
        SandboxMode::FullAccess => {
            return Some(format!(
                "full-access mode: '{prog}' runs with unrestricted host access"
            ));
        }
        SandboxMode::ReadOnly if may_write(invocation) => {
            return Some(format!("read-only mode: '{prog}' may need to write files"));
        }
        SandboxMode::ReadOnly | SandboxMode::WorkspaceWrite => {}
    }

    match profile.network() {
        NetworkPolicy::Off if may_need_network(invocation) => Some(format!(
            "network is disabled; '{prog}' may need network access"
        )),
        NetworkPolicy::Off | NetworkPolicy::On => None,
    }
}

fn may_need_network(invocation: &Invocation) -> bool {
    match invocation.kind() {
        ProgramKind::Git => invocation.has_any_arg(&["push", "ls-remote"]),
        ProgramKind::NodePackageManager => {
            invocation.has_any_arg(&["publish", "ci", "i", "outdated"])
        }
        ProgramKind::PythonPackageManager => {
            invocation.has_any_arg(&["search", "index", "sync", "lock"])
        }
        ProgramKind::Unknown => match invocation.program_basename() {
            "cargo" => invocation.has_any_arg(CARGO_NETWORK_SUBCOMMANDS),
            prog => REMOTE_PROGRAMS.contains(&prog),
        },
        ProgramKind::Downloader
        | ProgramKind::SystemTool
        | ProgramKind::Remove
        | ProgramKind::DestinationWriter
        | ProgramKind::Link
        | ProgramKind::Permissions
        | ProgramKind::StreamEditor
        | ProgramKind::DiskDump
        | ProgramKind::Shell => false,
    }
}

fn may_write(invocation: &Invocation) -> bool {
    match invocation.kind() {
        ProgramKind::Unknown => {
            BUILD_TOOLS.contains(&invocation.program_basename())
                || invocation.has_any_arg(&["build", "install"])
        }
        ProgramKind::Downloader
        | ProgramKind::Git
        | ProgramKind::NodePackageManager
        | ProgramKind::PythonPackageManager
        | ProgramKind::SystemTool
        | ProgramKind::Remove
        | ProgramKind::DestinationWriter
        | ProgramKind::Link
        | ProgramKind::Permissions
        | ProgramKind::StreamEditor
        | ProgramKind::DiskDump
        | ProgramKind::Shell => false,
    }
}
