//! Archive extraction and package discovery for the registry-archive
//! alternate path
//!
//! The UI framework's registry package is a zip-compatible archive whose
//! architecture-specific `.appx` packages live under
//! `tools/AppX/{arch}/Release`.

use std::fs::File;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, WingstrapError};

/// Extract a zip-compatible archive into `dest`
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| WingstrapError::ExtractFailed {
        path: archive.display().to_string(),
        reason: e.to_string(),
    })?;
    zip.extract(dest).map_err(|e| WingstrapError::ExtractFailed {
        path: archive.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Locate every `.appx` package under `subdir` of the extracted tree.
///
/// Zero matches is an error: an archive without the expected layout means
/// the alternate path cannot proceed either.
pub fn find_packages(extracted_root: &Path, subdir: &str, arch: &str) -> Result<Vec<PathBuf>> {
    let package_dir = extracted_root.join(subdir);
    let mut packages: Vec<PathBuf> = WalkDir::new(&package_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("appx"))
        })
        .map(|entry| entry.into_path())
        .collect();
    packages.sort();

    if packages.is_empty() {
        return Err(WingstrapError::NoPackagesInArchive {
            path: package_dir.display().to_string(),
            arch: arch.to_string(),
        });
    }
    Ok(packages)
}
