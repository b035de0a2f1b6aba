//! Classification of Appx deployment failure signals
//!
//! Every install attempt is wrapped: the raw signal from the deployment
//! facility is classified exactly once, immediately after capture, against a
//! closed table of known condition codes. The table is order-sensitive: the
//! resources-in-use entry is checked before the generic fallback.
//!
//! The asymmetry here is deliberate and preserved from long-standing behavior:
//! same/higher-version-already-installed is absorbed as benign, while
//! resources-in-use always propagates even though it can be transient.

use regex::Regex;
use std::sync::OnceLock;

/// A higher version of the package is already installed
/// (ERROR_INSTALL_PACKAGE_DOWNGRADE)
pub const HIGHER_VERSION_INSTALLED: u32 = 0x8007_3D06;

/// The same version of the package is already installed and reinstallation
/// was blocked (ERROR_PACKAGE_ALREADY_EXISTS)
pub const SAME_VERSION_INSTALLED: u32 = 0x8007_3CFB;

/// The package's resources are in use by a running app
/// (ERROR_PACKAGES_IN_USE)
pub const PACKAGES_IN_USE: u32 = 0x8007_3D02;

/// The remote server name could not be resolved
/// (ERROR_INTERNET_NAME_NOT_RESOLVED)
pub const SERVER_UNREACHABLE: u32 = 0x8007_2EE7;

/// Raw failure signal from one deployment attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignal {
    /// HRESULT extracted from the facility's error output, when present
    pub code: Option<u32>,
    /// Full error text, preserved for fatal propagation
    pub message: String,
}

impl RawSignal {
    pub fn new(code: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build a signal from raw error output, extracting the first HRESULT
    /// (`0x........`) if one is present.
    pub fn from_output(output: &str) -> Self {
        Self {
            code: parse_hresult(output),
            message: output.trim().to_string(),
        }
    }
}

/// Extract the first HRESULT-shaped hex code from error text
pub fn parse_hresult(text: &str) -> Option<u32> {
    static HRESULT_RE: OnceLock<Regex> = OnceLock::new();
    let re = HRESULT_RE
        .get_or_init(|| Regex::new(r"0[xX]([0-9A-Fa-f]{8})").expect("valid hresult regex"));
    re.captures(text)
        .and_then(|c| u32::from_str_radix(&c[1], 16).ok())
}

/// Known benign already-installed conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenignKind {
    HigherVersionInstalled,
    SameVersionInstalled,
}

impl BenignKind {
    pub fn describe(&self) -> &'static str {
        match self {
            BenignKind::HigherVersionInstalled => "a higher version is already installed",
            BenignKind::SameVersionInstalled => "the same version is already installed",
        }
    }
}

/// Known recoverable conditions: not a defect in this tool, but the run
/// cannot continue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverableKind {
    PackagesInUse,
    ServerUnreachable,
}

impl RecoverableKind {
    /// Remediation guidance, surfaced at the point of occurrence
    pub fn guidance(&self) -> &'static str {
        match self {
            RecoverableKind::PackagesInUse => {
                "Package resources are in use. Close any running instances of App Installer, \
                 Windows Terminal and other Microsoft Store apps, then run wingstrap again."
            }
            RecoverableKind::ServerUnreachable => {
                "The remote server could not be reached. Check your internet connection, or \
                 retry later if the download server is down."
            }
        }
    }
}

/// Outcome of classifying a raw signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Known already-installed condition; the caller continues
    Benign(BenignKind),
    /// Known environmental condition; the caller propagates with guidance
    Recoverable(RecoverableKind),
    /// Unclassified; propagated unchanged with full detail
    Fatal,
}

/// Classification table, matched in order. Resources-in-use precedes the
/// generic fallback.
const CODE_TABLE: &[(u32, Classification)] = &[
    (
        HIGHER_VERSION_INSTALLED,
        Classification::Benign(BenignKind::HigherVersionInstalled),
    ),
    (
        SAME_VERSION_INSTALLED,
        Classification::Benign(BenignKind::SameVersionInstalled),
    ),
    (
        PACKAGES_IN_USE,
        Classification::Recoverable(RecoverableKind::PackagesInUse),
    ),
    (
        SERVER_UNREACHABLE,
        Classification::Recoverable(RecoverableKind::ServerUnreachable),
    ),
];

/// Message patterns for signals that carry no numeric code. Same closed
/// table, same order.
const MESSAGE_TABLE: &[(&str, Classification)] = &[
    (
        "higher version",
        Classification::Benign(BenignKind::HigherVersionInstalled),
    ),
    (
        "already installed",
        Classification::Benign(BenignKind::SameVersionInstalled),
    ),
    (
        "resources it modifies are currently in use",
        Classification::Recoverable(RecoverableKind::PackagesInUse),
    ),
    (
        "server name or address could not be resolved",
        Classification::Recoverable(RecoverableKind::ServerUnreachable),
    ),
];

/// Classify a raw deployment failure signal.
///
/// Pure: same signal, same classification, every time.
pub fn classify(signal: &RawSignal) -> Classification {
    if let Some(code) = signal.code {
        for (known, classification) in CODE_TABLE {
            if code == *known {
                return *classification;
            }
        }
        return Classification::Fatal;
    }

    let lowered = signal.message.to_ascii_lowercase();
    for (pattern, classification) in MESSAGE_TABLE {
        if lowered.contains(pattern) {
            return *classification;
        }
    }
    Classification::Fatal
}
