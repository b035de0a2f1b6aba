//! Search-path variable maintenance
//!
//! Ensures the per-user app-execution directory is present on the `Path`
//! variable at both user and machine scope. Containment is checked on
//! delimited segments, never by raw substring, so `C:\Foo` does not satisfy
//! `C:\Foo2`. No locking: single-writer assumption, matching the tool's
//! single-run nature.

use std::path::Path;

use crate::error::{Result, WingstrapError};

/// List delimiter of the Windows `Path` variable
pub const PATH_DELIMITER: char = ';';

/// The two scopes the updater maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    User,
    Machine,
}

impl PathScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathScope::User => "User",
            PathScope::Machine => "Machine",
        }
    }
}

/// Seam over the environment-variable store
pub trait EnvPathStore {
    fn get(&self, scope: PathScope) -> Result<String>;
    fn set(&self, scope: PathScope, value: &str) -> Result<()>;
}

/// Segment equality: trailing separators and ASCII case are insignificant
fn segments_equal(a: &str, b: &str) -> bool {
    let norm = |s: &str| s.trim().trim_end_matches(['\\', '/']).to_ascii_lowercase();
    norm(a) == norm(b)
}

/// Compute the updated variable value, or `None` when no write is needed.
///
/// Deduplicates the whole list preserving order of first occurrence and
/// appends `dir` if absent. A value already containing `dir` exactly once
/// with no duplicates anywhere is a provable no-op.
pub fn ensure_path_entry(current: &str, dir: &str) -> Option<String> {
    let mut entries: Vec<&str> = Vec::new();
    for segment in current.split(PATH_DELIMITER) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if !entries.iter().any(|kept| segments_equal(kept, segment)) {
            entries.push(segment);
        }
    }

    if !entries.iter().any(|kept| segments_equal(kept, dir)) {
        entries.push(dir);
    }

    let updated = entries.join(";");
    if updated == current {
        None
    } else {
        Some(updated)
    }
}

/// Ensure `dir` is on the `Path` variable at both scopes.
///
/// Returns `true` if any scope was written.
pub fn update_search_path(store: &dyn EnvPathStore, dir: &Path) -> Result<bool> {
    let dir = dir.to_string_lossy();
    let mut wrote = false;
    for scope in [PathScope::User, PathScope::Machine] {
        let current = store.get(scope)?;
        if let Some(updated) = ensure_path_entry(&current, &dir) {
            store.set(scope, &updated)?;
            wrote = true;
        }
    }
    Ok(wrote)
}

/// Real store, backed by `[Environment]::GetEnvironmentVariable` /
/// `SetEnvironmentVariable` via PowerShell
pub struct SystemPathStore;

#[cfg(windows)]
impl EnvPathStore for SystemPathStore {
    fn get(&self, scope: PathScope) -> Result<String> {
        let output = std::process::Command::new("powershell")
            .args([
                "-NoProfile",
                "-NonInteractive",
                "-Command",
                &format!(
                    "[Environment]::GetEnvironmentVariable('Path', '{}')",
                    scope.as_str()
                ),
            ])
            .output()
            .map_err(|e| WingstrapError::PathReadFailed {
                scope: scope.as_str().to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(WingstrapError::PathReadFailed {
                scope: scope.as_str().to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    fn set(&self, scope: PathScope, value: &str) -> Result<()> {
        // PowerShell single-quoted literal: embedded quotes are doubled
        let quoted = value.replace('\'', "''");
        let output = std::process::Command::new("powershell")
            .args([
                "-NoProfile",
                "-NonInteractive",
                "-Command",
                &format!(
                    "[Environment]::SetEnvironmentVariable('Path', '{}', '{}')",
                    quoted,
                    scope.as_str()
                ),
            ])
            .output()
            .map_err(|e| WingstrapError::PathWriteFailed {
                scope: scope.as_str().to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(WingstrapError::PathWriteFailed {
                scope: scope.as_str().to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(not(windows))]
impl EnvPathStore for SystemPathStore {
    fn get(&self, scope: PathScope) -> Result<String> {
        Err(WingstrapError::PathReadFailed {
            scope: scope.as_str().to_string(),
            reason: "scoped Path variables are only available on Windows".to_string(),
        })
    }

    fn set(&self, scope: PathScope, _value: &str) -> Result<()> {
        Err(WingstrapError::PathWriteFailed {
            scope: scope.as_str().to_string(),
            reason: "scoped Path variables are only available on Windows".to_string(),
        })
    }
}
