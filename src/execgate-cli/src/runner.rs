//! Runs an allowed command.
//!
//! On Unix the gate replaces its own process image with the command, so
//! the caller sees the command's exit status directly. Elsewhere the
//! command is spawned with inherited stdio and its status is forwarded.

use std::io;
use std::process::Command;

use execgate_policy::Invocation;

/// Exit code when the program cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code when the program exists but cannot be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Changes into the invocation's working directory and starts the command.
///
/// Only returns when the command could not be started (Unix) or after it
/// finished (other platforms).
pub fn run(invocation: &Invocation) -> i32 {
    if let Err(err) = std::env::set_current_dir(invocation.cwd()) {
        eprintln!(
            "gate: cannot change to working directory '{}': {err}",
            invocation.cwd().display()
        );
        return crate::run_main::EXIT_USAGE;
    }

    tracing::debug!(cwd = %invocation.cwd().display(), argv = ?invocation.argv(), "starting command");

    match launch(invocation) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("gate: failed to execute '{}': {err}", invocation.program());
            spawn_error_exit_code(&err)
        }
    }
}

/// Execute the command using execvp semantics.
#[cfg(unix)]
fn launch(invocation: &Invocation) -> io::Result<i32> {
    use std::os::unix::process::CommandExt;

    // `exec` only returns on failure.
    Err(Command::new(invocation.program())
        .args(invocation.args())
        .exec())
}

#[cfg(not(unix))]
fn launch(invocation: &Invocation) -> io::Result<i32> {
    let status = Command::new(invocation.program())
        .args(invocation.args())
        .status()?;
    Ok(status.code().unwrap_or(1))
}

fn spawn_error_exit_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::NotFound => EXIT_NOT_FOUND,
        _ => EXIT_NOT_EXECUTABLE,
    }
}
