//! Path resolution and writable-root containment.
//!
//! Classifiers only ever see lexically normalised paths: nothing in the
//! decision path touches the filesystem. The one exception is
//! [`canonicalize_missing_ok`], which profile setup uses so that a root
//! reached through a symlink (e.g. `/tmp -> /private/tmp`) is recognised
//! under both spellings.
//!
//! # Containment
//!
//! A path is inside a root iff it equals the root or is a descendant of it,
//! compared component by component. `/tmp-evil` is *not* inside `/tmp`.

use std::path::{Component, Path, PathBuf};

use crate::error::GateError;

/// Lexically normalises a path: drops `.` components and folds `..` into
/// its parent. `..` never climbs above the root of an absolute path; leading
/// `..` components of a relative path are kept.
///
/// Does not access the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // Already at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Resolves `path` against `cwd` and normalises the result.
///
/// Absolute paths are returned normalised and otherwise unchanged. Missing
/// paths are fine: the target of `mkdir` usually does not exist yet.
pub fn resolve(path: impl AsRef<Path>, cwd: &Path) -> Result<PathBuf, GateError> {
    let path = path.as_ref();

    if path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(GateError::InvalidPath(format!(
            "'{}' contains a NUL byte",
            path.display()
        )));
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else if cwd.is_absolute() {
        cwd.join(path)
    } else {
        return Err(GateError::InvalidPath(format!(
            "cannot resolve '{}' against relative base '{}'",
            path.display(),
            cwd.display()
        )));
    };

    let resolved = normalize(&joined);
    tracing::trace!(input = %path.display(), resolved = %resolved.display(), "resolved path");
    Ok(resolved)
}

/// `realpath -m`: resolves symlinks in the longest existing prefix of the
/// (normalised) path and appends the missing remainder unchanged.
///
/// Falls back to the normalised path when no prefix can be resolved.
pub fn canonicalize_missing_ok(path: &Path) -> PathBuf {
    let normalized = normalize(path);
    let mut existing = normalized.as_path();
    let mut missing = Vec::new();

    loop {
        if let Ok(real) = dunce::canonicalize(existing) {
            let mut out = real;
            out.extend(missing.iter().rev());
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return normalized,
        }
    }
}

/// True iff `path` equals some root or is a proper descendant of one.
pub fn is_inside(path: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| path.starts_with(root))
}

/// Containment view used by the destructive-write classifier.
///
/// Borrowed from a [`Profile`](crate::Profile) and an
/// [`Invocation`](crate::Invocation) for the duration of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Containment<'a> {
    roots: &'a [PathBuf],
    cwd: &'a Path,
}

impl<'a> Containment<'a> {
    pub fn new(roots: &'a [PathBuf], cwd: &'a Path) -> Self {
        Self { roots, cwd }
    }

    /// The writable roots being checked against.
    pub fn roots(&self) -> &[PathBuf] {
        self.roots
    }

    /// True if `path`, resolved against the invocation cwd, is inside a root.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        match resolve(path, self.cwd) {
            Ok(resolved) => is_inside(&resolved, self.roots),
            Err(_) => false,
        }
    }

    /// True if `arg` is an absolute path that lies outside every root.
    ///
    /// Relative arguments are never reported: only absolute targets are
    /// checked by the program rules.
    pub fn is_absolute_outside(&self, arg: &str) -> bool {
        Path::new(arg).is_absolute() && !self.contains(arg)
    }
}
