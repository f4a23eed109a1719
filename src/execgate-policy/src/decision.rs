//! Gate decision types.

use serde::Serialize;

/// Exit code for a network policy denial.
pub const EXIT_NETWORK_DENIED: i32 = 113;

/// Exit code for a containment or system-level-tool denial.
pub const EXIT_CONTAINMENT_DENIED: i32 = 114;

/// Which rule family produced a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// Network intent while the profile has network off.
    Network,
    /// Destructive write outside the writable roots, or a system-level tool.
    Containment,
}

impl DenialKind {
    /// Stable process exit code for this kind of denial.
    pub fn exit_code(self) -> i32 {
        match self {
            DenialKind::Network => EXIT_NETWORK_DENIED,
            DenialKind::Containment => EXIT_CONTAINMENT_DENIED,
        }
    }
}

/// A policy denial with its machine-parseable reason.
///
/// The reason is always a single line: control characters coming from argv
/// are stored escaped (`\n`, `\u{1b}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub kind: DenialKind,
    pub reason: String,
}

impl Denial {
    pub fn network(reason: impl Into<String>) -> Self {
        Self::new(DenialKind::Network, reason)
    }

    pub fn containment(reason: impl Into<String>) -> Self {
        Self::new(DenialKind::Containment, reason)
    }

    pub fn new(kind: DenialKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: escape_control(&reason.into()),
        }
    }

    /// Stable process exit code for this denial.
    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

fn escape_control(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Outcome of evaluating one invocation against one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    /// The command may run.
    Allow,
    /// The command must not be started.
    Deny(Denial),
}

impl Decision {
    /// Returns true if the command may run.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Returns true if the command is blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Decision::Deny(_))
    }

    /// The denial, if any.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Decision::Allow => None,
            Decision::Deny(denial) => Some(denial),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allow => write!(f, "ALLOW"),
            Decision::Deny(denial) => write!(f, "DENY ({denial})"),
        }
    }
}
