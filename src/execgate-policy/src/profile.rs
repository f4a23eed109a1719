//! Gate profile: sandbox mode, network policy and writable roots.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::boundary::{canonicalize_missing_ok, normalize};
use crate::error::GateError;

/// Temp directory that is always writable.
pub const DEFAULT_TEMP_ROOT: &str = "/tmp";

/// Whether outbound network use is permitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkPolicy {
    On,
    #[default]
    Off,
}

impl NetworkPolicy {
    pub fn is_enabled(self) -> bool {
        matches!(self, NetworkPolicy::On)
    }
}

impl FromStr for NetworkPolicy {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(NetworkPolicy::On),
            "off" => Ok(NetworkPolicy::Off),
            _ => Err(GateError::InvalidNetworkPolicy(s.to_string())),
        }
    }
}

impl std::fmt::Display for NetworkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkPolicy::On => write!(f, "on"),
            NetworkPolicy::Off => write!(f, "off"),
        }
    }
}

/// How much of the host a command may modify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    /// Mutating programs and output redirections are denied.
    ReadOnly,
    /// Writes are confined to the writable roots.
    #[default]
    WorkspaceWrite,
    /// Only system-level tools are denied.
    FullAccess,
}

impl FromStr for SandboxMode {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read-only" => Ok(SandboxMode::ReadOnly),
            "workspace-write" => Ok(SandboxMode::WorkspaceWrite),
            "full-access" | "danger-full-access" => Ok(SandboxMode::FullAccess),
            _ => Err(GateError::InvalidSandboxMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxMode::ReadOnly => write!(f, "read-only"),
            SandboxMode::WorkspaceWrite => write!(f, "workspace-write"),
            SandboxMode::FullAccess => write!(f, "full-access"),
        }
    }
}

/// Immutable policy profile, built once per gate run.
///
/// `writable_roots` holds the caller's roots in declared order followed by
/// the implicit temp directories, so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    mode: SandboxMode,
    network: NetworkPolicy,
    writable_roots: Vec<PathBuf>,
}

impl Profile {
    /// Builds a profile with the implicit temp roots taken from the
    /// environment (`/tmp`, then `$TMPDIR` when it exists).
    pub fn new(network: NetworkPolicy, explicit_roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self::with_temp_roots(network, explicit_roots, implicit_temp_roots())
    }

    /// Builds a `workspace-write` profile with an explicit list of implicit
    /// temp roots.
    pub fn with_temp_roots(
        network: NetworkPolicy,
        explicit_roots: impl IntoIterator<Item = PathBuf>,
        temp_roots: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let mut writable_roots: Vec<PathBuf> = Vec::new();

        for root in explicit_roots.into_iter().chain(temp_roots) {
            let lexical = normalize(&root);
            let real = canonicalize_missing_ok(&lexical);
            for candidate in [lexical, real] {
                if !writable_roots.contains(&candidate) {
                    writable_roots.push(candidate);
                }
            }
        }

        tracing::debug!(%network, roots = ?writable_roots, "built profile");
        Self {
            mode: SandboxMode::default(),
            network,
            writable_roots,
        }
    }

    /// Replaces the sandbox mode.
    pub fn with_mode(mut self, mode: SandboxMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SandboxMode {
        self.mode
    }

    pub fn network(&self) -> NetworkPolicy {
        self.network
    }

    pub fn writable_roots(&self) -> &[PathBuf] {
        &self.writable_roots
    }

    /// True if `path` lies inside one of the writable roots.
    pub fn is_writable(&self, path: &Path) -> bool {
        crate::boundary::is_inside(path, &self.writable_roots)
    }
}

/// `/tmp`, plus `$TMPDIR` when set to an existing directory.
pub fn implicit_temp_roots() -> Vec<PathBuf> {
    implicit_temp_roots_from(std::env::var_os("TMPDIR"))
}

/// `/tmp`, plus `tmpdir` when it is an absolute path to an existing
/// directory.
pub fn implicit_temp_roots_from(tmpdir: Option<OsString>) -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from(DEFAULT_TEMP_ROOT)];
    if let Some(tmpdir) = tmpdir.map(PathBuf::from)
        && tmpdir.is_absolute()
        && tmpdir.is_dir()
    {
        roots.push(tmpdir);
    }
    roots
}
