//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};

/// wingstrap - bootstrap installer for winget
///
/// Installs the winget package-manager client and its framework dependencies.
#[derive(Parser, Debug)]
#[command(
    name = "wingstrap",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Bootstrap installer for the winget package-manager client",
    long_about = "wingstrap detects the host CPU architecture, installs the VCLibs runtime \
                  and UI.Xaml framework dependencies, installs winget itself from its latest \
                  release, and puts the WindowsApps directory on the Path.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  wingstrap\n    \
                  wingstrap --verbose\n    \
                  wingstrap --check-for-updates\n\n\
                  \x1b[1m\x1b[32mDocumentation:\x1b[0m\n    \
                  https://github.com/wingstrap/wingstrap"
)]
pub struct Cli {
    /// Check whether a newer wingstrap release is available, then exit
    #[arg(long)]
    pub check_for_updates: bool,

    /// Dump host/runtime diagnostics before proceeding
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
