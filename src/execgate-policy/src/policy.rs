//! Policy decision engine.

use crate::boundary::Containment;
use crate::command::Invocation;
use crate::decision::{Decision, Denial};
use crate::detection::{
    is_network_intent, is_system_level_tool, looks_destructive_outside_project,
    read_only_violation,
};
use crate::profile::{NetworkPolicy, Profile, SandboxMode};

/// Evaluates invocations against one immutable [`Profile`].
///
/// Rules are applied in order and the first one that fires wins:
///
/// 1. system-level tool → deny (containment), in every mode
/// 2. `full-access` mode → allow
/// 3. filesystem rule for the mode → deny (containment): any mutation in
///    `read-only`, a destructive write outside the writable roots in
///    `workspace-write`
/// 4. network off and network intent → deny (network)
/// 5. allow
///
/// A command that is both networked and destructive reports the
/// filesystem reason.
#[derive(Debug, Clone)]
pub struct ExecGate {
    profile: Profile,
}

impl ExecGate {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Evaluates an invocation. Pure and deterministic.
    pub fn evaluate(&self, invocation: &Invocation) -> Decision {
        let decision = decide(&self.profile, invocation);
        tracing::debug!(
            program = invocation.program_basename(),
            decision = %decision,
            "policy evaluated"
        );
        decision
    }
}

/// The decision procedure itself, over borrowed inputs.
pub fn decide(profile: &Profile, invocation: &Invocation) -> Decision {
    let prog = invocation.program_basename();

    if is_system_level_tool(invocation) {
        return Decision::Deny(Denial::containment(format!(
            "system-level tool blocked: {prog}"
        )));
    }

    let filesystem_violation = match profile.mode() {
        SandboxMode::FullAccess => return Decision::Allow,
        SandboxMode::ReadOnly => read_only_violation(invocation),
        SandboxMode::WorkspaceWrite => {
            let containment = Containment::new(profile.writable_roots(), invocation.cwd());
            looks_destructive_outside_project(invocation, &containment)
        }
    };
    if let Some(reason) = filesystem_violation {
        return Decision::Deny(Denial::containment(reason));
    }

    match profile.network() {
        NetworkPolicy::Off if is_network_intent(invocation) => Decision::Deny(Denial::network(
            format!("network disabled: blocking '{prog}'"),
        )),
        NetworkPolicy::Off | NetworkPolicy::On => Decision::Allow,
    }
}
