//! Error types and handling for wingstrap
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! The variants follow the failure taxonomy of the install flow: benign
//! already-installed conditions are absorbed before an error is ever
//! constructed (see `classify`), recoverable conditions carry remediation
//! guidance in their `help` text, and everything else is fatal.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for wingstrap operations
#[derive(Error, Diagnostic, Debug)]
pub enum WingstrapError {
    // Architecture errors
    #[error("Unknown CPU architecture detected: {value}")]
    #[diagnostic(
        code(wingstrap::arch::unknown),
        help("Supported architectures: x86, x64, arm, arm64")
    )]
    UnknownArchitecture { value: String },

    // Resolution errors (always fatal, no fallback beyond the documented pair)
    #[error("Failed to fetch release metadata for {repo}: {reason}")]
    #[diagnostic(
        code(wingstrap::resolve::release_lookup_failed),
        help("Check that the repository exists and the releases API is reachable")
    )]
    ReleaseLookupFailed { repo: String, reason: String },

    #[error("No release asset matching '{pattern}' in {repo}")]
    #[diagnostic(code(wingstrap::resolve::no_matching_asset))]
    NoMatchingAsset { repo: String, pattern: String },

    #[error("Store lookup failed for {identifier}: {reason}")]
    #[diagnostic(
        code(wingstrap::resolve::store_lookup_failed),
        help("The package-index lookup service may be down; the alternate source will be tried")
    )]
    StoreLookupFailed { identifier: String, reason: String },

    #[error("No package matching '{pattern}' returned by the store lookup for {identifier}")]
    #[diagnostic(code(wingstrap::resolve::no_matching_package))]
    NoMatchingPackage { identifier: String, pattern: String },

    // Download / archive errors
    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(
        code(wingstrap::net::download_failed),
        help("Check your internet connection and try again")
    )]
    DownloadFailed { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    #[diagnostic(code(wingstrap::net::http_status))]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to extract archive {path}: {reason}")]
    #[diagnostic(code(wingstrap::archive::extract_failed))]
    ExtractFailed { path: String, reason: String },

    #[error("No packages for architecture '{arch}' found under {path}")]
    #[diagnostic(
        code(wingstrap::archive::no_packages),
        help("The archive layout may have changed in a newer package version")
    )]
    NoPackagesInArchive { path: String, arch: String },

    // Install errors (classified — see classify.rs for the taxonomy)
    #[error("Failed to install {package}: {reason}")]
    #[diagnostic(code(wingstrap::install::failed))]
    InstallFailed { package: String, reason: String },

    #[error("Cannot install {package}: package resources are in use")]
    #[diagnostic(
        code(wingstrap::install::packages_in_use),
        help(
            "Close any running instances of App Installer, Windows Terminal and other \
             Microsoft Store apps, then run wingstrap again"
        )
    )]
    PackagesInUse { package: String },

    #[error("Cannot install {package}: the remote server could not be reached")]
    #[diagnostic(
        code(wingstrap::install::server_unreachable),
        help("Check your internet connection, or retry later if the download server is down")
    )]
    ServerUnreachable { package: String },

    // Environment / path errors
    #[error("Failed to read the Path variable at {scope} scope: {reason}")]
    #[diagnostic(code(wingstrap::pathenv::read_failed))]
    PathReadFailed { scope: String, reason: String },

    #[error("Failed to write the Path variable at {scope} scope: {reason}")]
    #[diagnostic(
        code(wingstrap::pathenv::write_failed),
        help("Machine-scope changes require an elevated (administrator) shell")
    )]
    PathWriteFailed { scope: String, reason: String },

    // Update check errors
    #[error("Invalid version '{version}': {reason}")]
    #[diagnostic(code(wingstrap::update::invalid_version))]
    InvalidVersion { version: String, reason: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(wingstrap::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for WingstrapError {
    fn from(err: std::io::Error) -> Self {
        WingstrapError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WingstrapError {
    fn from(err: serde_json::Error) -> Self {
        WingstrapError::IoError {
            message: format!("JSON parse error: {err}"),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, WingstrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WingstrapError::UnknownArchitecture {
            value: "MIPS".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown CPU architecture detected: MIPS");
    }

    #[test]
    fn test_error_code() {
        let err = WingstrapError::UnknownArchitecture {
            value: "MIPS".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("wingstrap::arch::unknown".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WingstrapError = io_err.into();
        assert!(matches!(err, WingstrapError::IoError { .. }));
    }

    #[test]
    fn test_packages_in_use_has_guidance() {
        let err = WingstrapError::PackagesInUse {
            package: "Microsoft.UI.Xaml".to_string(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("Close any running instances"));
    }

    #[test]
    fn test_no_matching_asset_error() {
        let err = WingstrapError::NoMatchingAsset {
            repo: "microsoft/winget-cli".to_string(),
            pattern: ".msixbundle".to_string(),
        };
        assert!(err.to_string().contains("No release asset"));
        assert!(err.to_string().contains("microsoft/winget-cli"));
    }

    #[test]
    fn test_server_unreachable_help_mentions_connection() {
        let err = WingstrapError::ServerUnreachable {
            package: "Microsoft.VCLibs".to_string(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("internet connection"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let err: WingstrapError = parse_result.unwrap_err().into();
        assert!(matches!(err, WingstrapError::IoError { .. }));
    }
}
