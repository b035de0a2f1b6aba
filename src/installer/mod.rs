//! Package installation through the OS Appx deployment facility
//!
//! Every attempt is wrapped: the raw signal from the facility is classified
//! exactly once (see `classify`) and acted on here. Installing an
//! already-installed equal-or-higher version is treated as success; this is a
//! documented idempotence requirement, not an incidental catch.

pub mod engine;

pub use engine::AppxEngine;

use std::path::{Path, PathBuf};

use console::Style;

use crate::classify::{BenignKind, Classification, RawSignal, classify};
use crate::error::{Result, WingstrapError};

/// A package reference the deployment facility accepts
#[derive(Debug, Clone)]
pub enum PackageRef {
    Local(PathBuf),
    Remote(String),
}

impl PackageRef {
    /// The path or URL handed to the facility
    pub fn as_argument(&self) -> String {
        match self {
            PackageRef::Local(path) => path.to_string_lossy().into_owned(),
            PackageRef::Remote(url) => url.clone(),
        }
    }
}

impl std::fmt::Display for PackageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_argument())
    }
}

/// Seam over the OS package-installation facility
pub trait PackageEngine {
    /// Plain per-user package install
    fn add_package(&self, package: &PackageRef) -> std::result::Result<(), RawSignal>;

    /// Provisioning install: registers the package for all current and
    /// future users; the main package requires its license file
    fn provision_package(
        &self,
        package: &PackageRef,
        license: Option<&Path>,
    ) -> std::result::Result<(), RawSignal>;
}

/// Outcome of one wrapped install attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// Benign classification: an equal or higher version was already there
    AlreadyInstalled(BenignKind),
}

/// Wraps a `PackageEngine`, interpreting its error signals through the
/// classifier
pub struct Installer<'a> {
    engine: &'a dyn PackageEngine,
}

impl<'a> Installer<'a> {
    pub fn new(engine: &'a dyn PackageEngine) -> Self {
        Self { engine }
    }

    /// Install a dependency package
    pub fn install(&self, name: &str, package: &PackageRef) -> Result<InstallOutcome> {
        match self.engine.add_package(package) {
            Ok(()) => Ok(InstallOutcome::Installed),
            Err(signal) => interpret(name, &signal),
        }
    }

    /// Provision the main package for all users
    pub fn provision(
        &self,
        name: &str,
        package: &PackageRef,
        license: Option<&Path>,
    ) -> Result<InstallOutcome> {
        match self.engine.provision_package(package, license) {
            Ok(()) => Ok(InstallOutcome::Installed),
            Err(signal) => interpret(name, &signal),
        }
    }
}

/// Classify once, immediately, and act on the classification
fn interpret(name: &str, signal: &RawSignal) -> Result<InstallOutcome> {
    match classify(signal) {
        Classification::Benign(kind) => {
            println!(
                "  {} {} ({})",
                Style::new().dim().apply_to("skipped:"),
                name,
                kind.describe()
            );
            Ok(InstallOutcome::AlreadyInstalled(kind))
        }
        Classification::Recoverable(kind) => {
            eprintln!(
                "{} {}",
                Style::new().yellow().bold().apply_to("warning:"),
                kind.guidance()
            );
            Err(match kind {
                crate::classify::RecoverableKind::PackagesInUse => WingstrapError::PackagesInUse {
                    package: name.to_string(),
                },
                crate::classify::RecoverableKind::ServerUnreachable => {
                    WingstrapError::ServerUnreachable {
                        package: name.to_string(),
                    }
                }
            })
        }
        Classification::Fatal => Err(WingstrapError::InstallFailed {
            package: name.to_string(),
            reason: signal.message.clone(),
        }),
    }
}
