//! Immutable per-run configuration
//!
//! All architecture-specific URLs, patterns and temp locations are derived
//! once, up front, and passed by reference to every component. No component
//! re-detects the architecture or recomputes a URL mid-run.

use std::path::PathBuf;

use regex::Regex;

use crate::arch::Architecture;
use crate::error::Result;
use crate::temp;

/// Pinned Microsoft.UI.Xaml version for the registry-archive alternate path
pub const UI_XAML_VERSION: &str = "2.8.6";

/// How to obtain a dependency when the store lookup (primary) fails
#[derive(Debug, Clone)]
pub enum AlternateSource {
    /// Well-known version-pinned static URL; install directly
    PinnedUrl(String),
    /// Versioned archive from a public package registry; extract, then
    /// install every architecture-specific package found in `package_subdir`
    RegistryArchive {
        url: String,
        /// Directory inside the extracted tree holding the `.appx` packages
        package_subdir: String,
    },
}

/// How to obtain and install one framework dependency
#[derive(Debug, Clone)]
pub struct DependencySpec {
    /// Human-readable name, used in output and error detail
    pub name: &'static str,
    /// Package family name for the store lookup (primary source)
    pub package_family: &'static str,
    /// Architecture-specific file-name pattern applied to lookup results
    pub package_pattern: Regex,
    pub alternate: AlternateSource,
}

/// How to obtain and install the main package (winget itself)
#[derive(Debug, Clone)]
pub struct MainPackageSpec {
    pub name: &'static str,
    pub owner: &'static str,
    pub repo: &'static str,
    /// Matches the installable bundle among the release assets
    pub bundle_pattern: Regex,
    /// Matches the license file needed for the provisioning install
    pub license_pattern: Regex,
}

/// Immutable run context, constructed once at start
#[derive(Debug, Clone)]
pub struct RunContext {
    pub arch: Architecture,
    pub verbose: bool,
    /// Per-run scratch directory under the OS temp base
    pub temp_dir: PathBuf,
    pub runtime_lib: DependencySpec,
    pub ui_framework: DependencySpec,
    pub main_package: MainPackageSpec,
    /// Directory that must end up on the user and machine Path
    pub apps_dir: PathBuf,
}

// Compiled from constant strings; a failure here is a programming error.
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("valid constant pattern")
}

impl RunContext {
    pub fn new(arch: Architecture, verbose: bool) -> Result<Self> {
        let arch_token = arch.as_str();
        let temp_dir = temp::temp_dir_base().join(format!("wingstrap-{}", std::process::id()));

        let runtime_lib = DependencySpec {
            name: "Microsoft.VCLibs Desktop framework",
            package_family: "Microsoft.VCLibs.140.00.UWPDesktop_8wekyb3d8bbwe",
            package_pattern: pattern(&format!(r"(?i)_{arch_token}__.*\.appx$")),
            alternate: AlternateSource::PinnedUrl(format!(
                "https://aka.ms/Microsoft.VCLibs.{arch_token}.14.00.Desktop.appx"
            )),
        };

        let ui_framework = DependencySpec {
            name: "Microsoft.UI.Xaml framework",
            package_family: "Microsoft.UI.Xaml.2.8_8wekyb3d8bbwe",
            package_pattern: pattern(&format!(r"(?i)_{arch_token}__.*\.appx$")),
            alternate: AlternateSource::RegistryArchive {
                url: format!(
                    "https://www.nuget.org/api/v2/package/Microsoft.UI.Xaml/{UI_XAML_VERSION}"
                ),
                package_subdir: format!("tools/AppX/{arch_token}/Release"),
            },
        };

        let main_package = MainPackageSpec {
            name: "winget (Microsoft.DesktopAppInstaller)",
            owner: "microsoft",
            repo: "winget-cli",
            bundle_pattern: pattern(r"Microsoft\.DesktopAppInstaller_8wekyb3d8bbwe\.msixbundle$"),
            license_pattern: pattern(r"_License1\.xml$"),
        };

        let apps_dir = dirs::data_local_dir()
            .unwrap_or_else(temp::temp_dir_base)
            .join("Microsoft")
            .join("WindowsApps");

        Ok(Self {
            arch,
            verbose,
            temp_dir,
            runtime_lib,
            ui_framework,
            main_package,
            apps_dir,
        })
    }
}
