//! The command vector being classified.

use std::path::{Path, PathBuf};

use crate::error::GateError;
use crate::program::{ProgramKind, basename};

/// A proposed command: working directory plus an already tokenised argv.
///
/// Immutable once built. The program basename and its [`ProgramKind`] are
/// computed once here so every classifier dispatches on the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    cwd: PathBuf,
    argv: Vec<String>,
    program_basename: String,
    kind: ProgramKind,
}

impl Invocation {
    /// Builds an invocation. `argv` must be non-empty and `cwd` absolute.
    pub fn new(cwd: impl Into<PathBuf>, argv: Vec<String>) -> Result<Self, GateError> {
        let cwd = cwd.into();
        let Some(program) = argv.first() else {
            return Err(GateError::EmptyCommand);
        };
        if !cwd.is_absolute() {
            return Err(GateError::InvalidPath(format!(
                "working directory must be absolute: {}",
                cwd.display()
            )));
        }

        let program_basename = basename(program).to_string();
        let kind = ProgramKind::from_basename(&program_basename);

        Ok(Self {
            cwd: crate::boundary::normalize(&cwd),
            argv,
            program_basename,
            kind,
        })
    }

    /// Convenience constructor from string slices.
    pub fn from_args<S: AsRef<str>>(cwd: impl Into<PathBuf>, argv: &[S]) -> Result<Self, GateError> {
        Self::new(cwd, argv.iter().map(|s| s.as_ref().to_string()).collect())
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The full argument vector, program included.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// `argv[0]` as given.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// `argv[0]` without its directory.
    pub fn program_basename(&self) -> &str {
        &self.program_basename
    }

    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// The last argument, if any.
    pub fn last_arg(&self) -> Option<&str> {
        self.args().last().map(String::as_str)
    }

    /// First argument, if any.
    pub fn first_arg(&self) -> Option<&str> {
        self.args().first().map(String::as_str)
    }

    /// Check if an argument is present (exact match).
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args().iter().any(|a| a == arg)
    }

    /// Check if any argument is one of `candidates`.
    pub fn has_any_arg(&self, candidates: &[&str]) -> bool {
        self.args().iter().any(|a| candidates.contains(&a.as_str()))
    }

    /// Check if any argument starts with a prefix.
    pub fn has_arg_starting_with(&self, prefix: &str) -> bool {
        self.args().iter().any(|a| a.starts_with(prefix))
    }

    /// Value following the short flag `-<flag>`, also matching clustered
    /// forms like `-ec` where the flag is last in the cluster.
    pub fn short_flag_value(&self, flag: char) -> Option<&str> {
        let args = self.args();
        args.iter().enumerate().find_map(|(i, arg)| {
            let cluster = arg.strip_prefix('-')?;
            if cluster.starts_with('-') || !cluster.ends_with(flag) {
                return None;
            }
            args.get(i + 1).map(String::as_str)
        })
    }
}
