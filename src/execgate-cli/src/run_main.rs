//! Main entry point for the gate wrapper.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use execgate_policy::{
    Decision, ExecGate, GateError, Invocation, Profile, advise, implicit_temp_roots, normalize,
    resolve,
};

use crate::args::GateArgs;
use crate::logging::init_logging;
use crate::runner;

/// Exit code for a malformed gate invocation.
pub const EXIT_USAGE: i32 = 1;

/// Profile and invocation derived from the gate's arguments.
#[derive(Debug, Clone)]
pub struct GateSetup {
    pub profile: Profile,
    pub invocation: Invocation,
}

impl GateSetup {
    /// Builds the setup against the real process cwd and temp directories.
    pub fn from_args(args: &GateArgs) -> anyhow::Result<Self> {
        let process_cwd =
            std::env::current_dir().context("cannot determine the current directory")?;
        Self::resolve(args, &process_cwd, implicit_temp_roots())
    }

    /// Builds the setup. Relative `--cwd` and `--writable` paths are
    /// resolved against `process_cwd`.
    pub fn resolve(
        args: &GateArgs,
        process_cwd: &Path,
        temp_roots: Vec<PathBuf>,
    ) -> anyhow::Result<Self> {
        if args.command.is_empty() {
            return Err(GateError::EmptyCommand.into());
        }

        let cwd = match &args.cwd {
            Some(cwd) => resolve(cwd, process_cwd)
                .with_context(|| format!("invalid --cwd '{}'", cwd.display()))?,
            None => normalize(process_cwd),
        };

        let roots = args
            .writable
            .iter()
            .map(|root| {
                resolve(root, process_cwd)
                    .with_context(|| format!("invalid --writable '{}'", root.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let profile =
            Profile::with_temp_roots(args.network, roots, temp_roots).with_mode(args.mode);
        let invocation = Invocation::new(cwd, args.command.clone())?;

        Ok(Self {
            profile,
            invocation,
        })
    }
}

/// Main entry point.
pub fn run_main() -> ! {
    let code = match GateArgs::try_parse() {
        Ok(args) => run(&args),
        Err(err) => {
            let _ = err.print();
            if err.use_stderr() { EXIT_USAGE } else { 0 }
        }
    };
    std::process::exit(code)
}

/// Evaluates the policy and runs the command if allowed. Returns the exit
/// code the gate should terminate with.
pub fn run(args: &GateArgs) -> i32 {
    init_logging(args.log_level.as_deref());

    let setup = match GateSetup::from_args(args) {
        Ok(setup) => setup,
        Err(err) => {
            eprintln!("gate: {err:#}");
            return EXIT_USAGE;
        }
    };

    tracing::debug!(
        mode = %setup.profile.mode(),
        network = %setup.profile.network(),
        "profile ready"
    );
    let gate = ExecGate::new(setup.profile);
    let invocation = setup.invocation;

    match gate.evaluate(&invocation) {
        Decision::Deny(denial) => {
            tracing::info!(kind = ?denial.kind, "command denied");
            eprintln!("denied by policy: {denial}");
            denial.exit_code()
        }
        Decision::Allow => {
            if let Some(hint) = advise(gate.profile(), &invocation) {
                tracing::warn!("{hint}");
            }
            if args.dry_run {
                tracing::info!(argv = ?invocation.argv(), "dry run: command allowed, not started");
                return 0;
            }
            runner::run(&invocation)
        }
    }
}
