//! Host CPU architecture detection
//!
//! Detection happens exactly once per run, in [`Architecture::detect`], and the
//! result is carried in the run context. Package file names embed the
//! architecture token returned by [`Architecture::as_str`].

use std::env;

use crate::error::{Result, WingstrapError};

/// Host CPU architecture, as used in package file names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    X86,
    X64,
    Arm,
    Arm64,
}

impl Architecture {
    /// The token used in architecture-specific package names (e.g. `x64` in
    /// `Microsoft.VCLibs.x64.14.00.Desktop.appx`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Map a host CPU identification code to an architecture.
    ///
    /// Accepts both `PROCESSOR_ARCHITECTURE` values (`AMD64`, `ARM64`, `x86`,
    /// `ARM`) and Rust target codes (`x86_64`, `aarch64`, `i686`). Unknown
    /// codes are a fatal error, never silently defaulted.
    pub fn from_machine(code: &str) -> Result<Self> {
        match code.to_ascii_lowercase().as_str() {
            "x86" | "i686" | "i586" => Ok(Architecture::X86),
            "amd64" | "x86_64" | "x64" => Ok(Architecture::X64),
            "arm" => Ok(Architecture::Arm),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            _ => Err(WingstrapError::UnknownArchitecture {
                value: code.to_string(),
            }),
        }
    }

    /// Detect the host architecture.
    ///
    /// Prefers `PROCESSOR_ARCHITECTURE` (authoritative on Windows, including
    /// under WOW64 emulation via the compiled-in fallback), then the compile
    /// target architecture.
    pub fn detect() -> Result<Self> {
        let code = env::var("PROCESSOR_ARCHITECTURE")
            .unwrap_or_else(|_| env::consts::ARCH.to_string());
        Self::from_machine(&code)
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
