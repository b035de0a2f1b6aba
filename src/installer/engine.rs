//! Real deployment engine, backed by the Windows Appx facility
//!
//! Packages are installed through PowerShell (`Add-AppxPackage` and, for the
//! provisioning install, `Add-AppxProvisionedPackage`). Progress output is
//! suppressed; the error stream is captured intact and turned into a
//! `RawSignal` for classification.

use std::path::Path;

use crate::classify::RawSignal;

use super::{PackageEngine, PackageRef};

/// Engine invoking the Appx deployment facility
pub struct AppxEngine;

// PowerShell single-quoted literal: embedded quotes are doubled
#[cfg(windows)]
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(windows)]
fn run_deployment(script: &str) -> Result<(), RawSignal> {
    let output = std::process::Command::new("powershell")
        .args([
            "-NoProfile",
            "-NonInteractive",
            "-Command",
            // Silence the facility's progress stream, never its error stream
            &format!("$ProgressPreference = 'SilentlyContinue'; {script} | Out-Null"),
        ])
        .output()
        .map_err(|e| RawSignal::new(None, format!("failed to invoke PowerShell: {e}")))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(RawSignal::from_output(&String::from_utf8_lossy(
            &output.stderr,
        )))
    }
}

#[cfg(windows)]
impl PackageEngine for AppxEngine {
    fn add_package(&self, package: &PackageRef) -> Result<(), RawSignal> {
        run_deployment(&format!(
            "Add-AppxPackage -Path {} -ErrorAction Stop",
            quote(&package.as_argument())
        ))
    }

    fn provision_package(
        &self,
        package: &PackageRef,
        license: Option<&Path>,
    ) -> Result<(), RawSignal> {
        let license_arg = match license {
            Some(path) => format!("-LicensePath {}", quote(&path.to_string_lossy())),
            None => "-SkipLicense".to_string(),
        };
        run_deployment(&format!(
            "Add-AppxProvisionedPackage -Online -PackagePath {} {} -ErrorAction Stop",
            quote(&package.as_argument()),
            license_arg
        ))
    }
}

#[cfg(not(windows))]
impl PackageEngine for AppxEngine {
    fn add_package(&self, _package: &PackageRef) -> Result<(), RawSignal> {
        Err(RawSignal::new(
            None,
            "Appx deployment is only available on Windows",
        ))
    }

    fn provision_package(
        &self,
        _package: &PackageRef,
        _license: Option<&Path>,
    ) -> Result<(), RawSignal> {
        Err(RawSignal::new(
            None,
            "Appx deployment is only available on Windows",
        ))
    }
}
