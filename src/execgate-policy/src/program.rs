//! Program categories recognised by the classifiers.
//!
//! Every classifier matches exhaustively on [`ProgramKind`], so a program
//! the gate knows nothing about goes through the explicit `Unknown` arm
//! rather than an implicit default.

use serde::Serialize;

/// Basenames that are blocked unconditionally, whatever the profile says.
/// `mkfs` also covers every `mkfs.*` variant.
pub const SYSTEM_TOOLS: &[&str] = &[
    "sudo",
    "mount",
    "umount",
    "mkfs",
    "swapon",
    "swapoff",
    "shutdown",
    "reboot",
    "halt",
    "poweroff",
    "sysctl",
    "modprobe",
    "insmod",
    "rmmod",
    "iptables",
    "ip6tables",
    "ufw",
    "nmcli",
    "systemctl",
    "docker",
    "podman",
];

/// Closed set of program categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramKind {
    /// `curl`, `wget`
    Downloader,
    /// `git`
    Git,
    /// `npm`, `pnpm`, `yarn`
    NodePackageManager,
    /// `pip`, `pip3`, `uv`
    PythonPackageManager,
    /// Anything in [`SYSTEM_TOOLS`], plus `mkfs*`
    SystemTool,
    /// `rm`
    Remove,
    /// `mv`, `cp`, `mkdir`, `touch`, `install`, `rsync`
    DestinationWriter,
    /// `ln`
    Link,
    /// `chmod`, `chown`
    Permissions,
    /// `sed`
    StreamEditor,
    /// `dd`
    DiskDump,
    /// `sh`, `bash`, `dash`, `zsh`, `ksh`
    Shell,
    /// Everything else. Treated as non-networked and non-destructive.
    Unknown,
}

impl ProgramKind {
    /// Categorise a program by its basename.
    pub fn from_basename(name: &str) -> Self {
        match name {
            "curl" | "wget" => Self::Downloader,
            "git" => Self::Git,
            "npm" | "pnpm" | "yarn" => Self::NodePackageManager,
            "pip" | "pip3" | "uv" => Self::PythonPackageManager,
            "rm" => Self::Remove,
            "mv" | "cp" | "mkdir" | "touch" | "install" | "rsync" => Self::DestinationWriter,
            "ln" => Self::Link,
            "chmod" | "chown" => Self::Permissions,
            "sed" => Self::StreamEditor,
            "dd" => Self::DiskDump,
            "sh" | "bash" | "dash" | "zsh" | "ksh" => Self::Shell,
            name if is_system_tool_name(name) => Self::SystemTool,
            _ => Self::Unknown,
        }
    }
}

fn is_system_tool_name(name: &str) -> bool {
    name.starts_with("mkfs") || SYSTEM_TOOLS.contains(&name)
}

/// Final path component of `program`, or `program` itself when it has none.
pub fn basename(program: &str) -> &str {
    std::path::Path::new(program)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(program)
}
