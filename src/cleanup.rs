//! Best-effort removal of temporary artifacts
//!
//! Artifacts are registered as they are created and removed silently at the
//! end of a successful run. Removal failures are ignored; cleanup is not
//! guaranteed on the failure path.

use std::path::{Path, PathBuf};

/// Filesystem paths created during the run
#[derive(Debug, Default)]
pub struct TempArtifacts {
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path for end-of-run removal
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Remove everything registered, silently. Directories are removed
    /// recursively.
    pub fn remove_all(&self) {
        for path in &self.paths {
            remove_quietly(path);
        }
    }
}

fn remove_quietly(path: &Path) {
    if path.is_dir() {
        let _ = std::fs::remove_dir_all(path);
    } else {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_files_and_directories() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("package.appx");
        let dir = temp.path().join("extracted");
        std::fs::write(&file, b"payload").unwrap();
        std::fs::create_dir_all(dir.join("nested")).unwrap();

        let mut artifacts = TempArtifacts::new();
        artifacts.register(&file);
        artifacts.register(&dir);
        artifacts.remove_all();

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_paths_are_ignored() {
        let mut artifacts = TempArtifacts::new();
        artifacts.register("/nonexistent/wingstrap-test/nothing.appx");
        // Must not panic or error
        artifacts.remove_all();
    }

    #[test]
    fn test_empty_registry() {
        // Must not panic with nothing registered
        TempArtifacts::new().remove_all();
    }
}
