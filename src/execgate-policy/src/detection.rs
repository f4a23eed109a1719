//! Command classifiers.
//!
//! Independent, total, pure functions over an [`Invocation`]. They look
//! only at the program basename and the argument strings and never touch
//! the filesystem.
//!
//! Classification is biased toward false negatives: a program the tables
//! do not know is treated as neither networked nor destructive.
//!
//! Redirection targets are only visible when they appear literally in the
//! argument vector (or in a `sh -c` script string). Targets built through
//! variable expansion or command substitution (`> "$OUT"`) cannot be seen.
//! Inside a script string, quoting is gone after tokenisation, so a quoted
//! word such as `'a>/etc/x'` is read as a redirection.

use crate::boundary::Containment;
use crate::command::Invocation;
use crate::program::ProgramKind;

/// `git` subcommands that talk to a remote.
const GIT_NETWORK_SUBCOMMANDS: &[&str] = &["clone", "fetch", "pull", "submodule", "remote"];

/// `git` global options whose value is a separate argument.
const GIT_VALUE_OPTIONS: &[&str] = &[
    "-C",
    "-c",
    "--git-dir",
    "--work-tree",
    "--namespace",
    "--exec-path",
];

/// `npm`/`pnpm`/`yarn` verbs that hit the registry.
const NODE_NETWORK_VERBS: &[&str] = &["install", "add", "update", "upgrade"];

/// `pip`/`uv` subcommands that hit an index.
const PYTHON_NETWORK_SUBCOMMANDS: &[&str] = &["install", "download", "wheel"];

/// `git` subcommands that only read the repository.
const GIT_READ_ONLY_SUBCOMMANDS: &[&str] = &[
    "status",
    "show",
    "diff",
    "log",
    "ls-files",
    "grep",
    "blame",
    "rev-parse",
];

/// Programs outside the known categories that write on every run.
const READ_ONLY_BLOCKED_TOOLS: &[&str] = &["cargo", "apt-get", "brew", "awk"];

/// Heuristic: is this command likely to perform outbound network I/O?
pub fn is_network_intent(invocation: &Invocation) -> bool {
    let verdict = match invocation.kind() {
        ProgramKind::Downloader => true,
        ProgramKind::Git => git_subcommand(invocation.args())
            .is_some_and(|sub| GIT_NETWORK_SUBCOMMANDS.contains(&sub)),
        ProgramKind::NodePackageManager => invocation.has_any_arg(NODE_NETWORK_VERBS),
        ProgramKind::PythonPackageManager => python_subcommand(invocation)
            .is_some_and(|sub| PYTHON_NETWORK_SUBCOMMANDS.contains(&sub)),
        ProgramKind::SystemTool
        | ProgramKind::Remove
        | ProgramKind::DestinationWriter
        | ProgramKind::Link
        | ProgramKind::Permissions
        | ProgramKind::StreamEditor
        | ProgramKind::DiskDump
        | ProgramKind::Shell
        | ProgramKind::Unknown => false,
    };

    tracing::debug!(program = invocation.program_basename(), verdict, "network intent");
    verdict
}

/// True iff the program is on the unconditional system-tool deny-list.
pub fn is_system_level_tool(invocation: &Invocation) -> bool {
    match invocation.kind() {
        ProgramKind::SystemTool => true,
        ProgramKind::Downloader
        | ProgramKind::Git
        | ProgramKind::NodePackageManager
        | ProgramKind::PythonPackageManager
        | ProgramKind::Remove
        | ProgramKind::DestinationWriter
        | ProgramKind::Link
        | ProgramKind::Permissions
        | ProgramKind::StreamEditor
        | ProgramKind::DiskDump
        | ProgramKind::Shell
        | ProgramKind::Unknown => false,
    }
}

/// Returns a reason if the command writes to, or deletes, a target outside
/// the writable roots.
///
/// The per-program rule runs first; the generic redirection scan applies to
/// every program.
pub fn looks_destructive_outside_project(
    invocation: &Invocation,
    containment: &Containment<'_>,
) -> Option<String> {
    let prog = invocation.program_basename();

    let program_rule = match invocation.kind() {
        ProgramKind::Remove => check_remove(invocation, containment),
        ProgramKind::DestinationWriter | ProgramKind::Link | ProgramKind::Permissions => {
            check_last_argument(invocation, containment)
        }
        ProgramKind::StreamEditor => check_sed_in_place(invocation, containment),
        ProgramKind::DiskDump => check_dd(invocation, containment),
        ProgramKind::Shell => check_shell_script(invocation, containment),
        ProgramKind::Downloader
        | ProgramKind::Git
        | ProgramKind::NodePackageManager
        | ProgramKind::PythonPackageManager
        | ProgramKind::SystemTool
        | ProgramKind::Unknown => None,
    };

    let reason = program_rule.or_else(|| scan_redirections(invocation.args(), containment));
    tracing::debug!(program = prog, reason = ?reason, "destructive write check");
    reason
}

/// Returns a reason if the command would modify anything under a read-only
/// profile: a mutating program, a non-reading `git` subcommand, or an output
/// redirection to a file.
pub fn read_only_violation(invocation: &Invocation) -> Option<String> {
    let prog = invocation.program_basename();

    let program_rule = match invocation.kind() {
        ProgramKind::Downloader
        | ProgramKind::NodePackageManager
        | ProgramKind::PythonPackageManager
        | ProgramKind::Remove
        | ProgramKind::DestinationWriter
        | ProgramKind::Link
        | ProgramKind::Permissions
        | ProgramKind::StreamEditor
        | ProgramKind::DiskDump
        | ProgramKind::Shell => Some(format!("read-only mode blocks '{prog}'")),
        ProgramKind::Git => git_subcommand(invocation.args())
            .filter(|sub| !GIT_READ_ONLY_SUBCOMMANDS.contains(sub))
            .map(|sub| format!("read-only mode blocks 'git {sub}'")),
        ProgramKind::Unknown => READ_ONLY_BLOCKED_TOOLS
            .contains(&prog)
            .then(|| format!("read-only mode blocks '{prog}'")),
        ProgramKind::SystemTool => None,
    };

    let reason = program_rule.or_else(|| {
        redirection_targets(invocation.args())
            .find(|target| !is_harmless_redirect_target(target))
            .map(|target| format!("read-only mode blocks redirect: {target}"))
    });
    tracing::debug!(program = prog, reason = ?reason, "read-only check");
    reason
}

/// `&N` duplicates a descriptor and `/dev/null` discards output.
fn is_harmless_redirect_target(target: &str) -> bool {
    target.starts_with('&') || target == "/dev/null"
}

/// First argument that is neither a flag nor the value of a flag.
fn git_subcommand(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if GIT_VALUE_OPTIONS.contains(&arg.as_str()) {
            iter.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return Some(arg.as_str());
    }
    None
}

/// The first argument, skipping the `pip` shim in `uv pip <sub>`.
fn python_subcommand(invocation: &Invocation) -> Option<&str> {
    let args = invocation.args();
    match (invocation.program_basename(), args.first().map(String::as_str)) {
        ("uv", Some("pip")) => args.get(1).map(String::as_str),
        (_, first) => first,
    }
}

fn check_remove(invocation: &Invocation, containment: &Containment<'_>) -> Option<String> {
    if let Some(root) = invocation
        .args()
        .iter()
        .find(|arg| arg.as_str() == "/" || arg.as_str() == "/*")
    {
        return Some(format!("rm of filesystem root: {root}"));
    }

    invocation
        .args()
        .iter()
        .find(|arg| containment.is_absolute_outside(arg.as_str()))
        .map(|arg| format!("rm outside project: {arg}"))
}

/// Destination-argument convention: the last argument is the target.
fn check_last_argument(invocation: &Invocation, containment: &Containment<'_>) -> Option<String> {
    let target = invocation.last_arg()?;
    containment
        .is_absolute_outside(target)
        .then(|| format!("{} outside project: {target}", invocation.program_basename()))
}

fn check_sed_in_place(invocation: &Invocation, containment: &Containment<'_>) -> Option<String> {
    let in_place =
        invocation.has_arg_starting_with("-i") || invocation.has_arg_starting_with("--in-place");
    if !in_place {
        return None;
    }

    let target = invocation.last_arg()?;
    containment
        .is_absolute_outside(target)
        .then(|| format!("sed -i outside project: {target}"))
}

fn check_dd(invocation: &Invocation, containment: &Containment<'_>) -> Option<String> {
    invocation.args().iter().find_map(|arg| {
        let target = arg.strip_prefix("of=")?;
        if target.starts_with("/dev/") {
            Some(format!("dd to device: {target}"))
        } else if containment.is_absolute_outside(target) {
            Some(format!("dd outside project: {target}"))
        } else {
            None
        }
    })
}

/// Applies the redirection scan to the script of `sh -c '<script>'`.
fn check_shell_script(invocation: &Invocation, containment: &Containment<'_>) -> Option<String> {
    let script = invocation.short_flag_value('c')?;
    let tokens = shlex::split(script)
        .unwrap_or_else(|| script.split_whitespace().map(String::from).collect());
    scan_redirections(&split_attached_redirections(tokens), containment)
}

/// Splits `word>target` script tokens into `word` and `>target`. Shell words
/// carry no quoting after tokenisation, so `echo hi>/etc/motd` has to be
/// taken apart here.
fn split_attached_redirections(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.find('>') {
            Some(pos) if pos > 0 && redirection_operator(&token).is_none() => {
                let (word, redirect) = token.split_at(pos);
                out.push(word.to_string());
                out.push(redirect.to_string());
            }
            _ => out.push(token),
        }
    }
    out
}

/// If `token` is an output redirection operator (`>`, `>>`, `N>`, `N>>`),
/// returns whatever follows the operator inside the same token. An empty
/// string means the target is the next token.
fn redirection_operator(token: &str) -> Option<&str> {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = rest.strip_prefix('>')?;
    Some(rest.strip_prefix('>').unwrap_or(rest))
}

/// Every output redirection target in `tokens`, in order.
fn redirection_targets(tokens: &[String]) -> impl Iterator<Item = &str> {
    tokens.iter().enumerate().filter_map(move |(i, token)| {
        let attached = redirection_operator(token)?;
        if attached.is_empty() {
            tokens.get(i + 1).map(String::as_str)
        } else {
            Some(attached)
        }
    })
}

/// Generic scan for redirections to absolute paths outside the roots.
pub(crate) fn scan_redirections(tokens: &[String], containment: &Containment<'_>) -> Option<String> {
    redirection_targets(tokens)
        .find(|target| containment.is_absolute_outside(target))
        .map(|target| format!("redirect outside project: {target}"))
}
