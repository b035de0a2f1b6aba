//! wingstrap - bootstrap installer for winget
//!
//! Detects the host CPU architecture, installs the VCLibs runtime and
//! UI.Xaml framework dependencies, installs the winget client from its
//! latest release, and ensures the WindowsApps directory is on the Path.

use std::process::ExitCode;

use clap::Parser;

mod arch;
mod classify;
mod cleanup;
mod cli;
mod commands;
mod context;
mod error;
mod extract;
mod installer;
mod net;
mod orchestrator;
mod pathenv;
mod progress;
mod resolver;
mod temp;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.check_for_updates {
        return match commands::check_updates::run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    // The install run prints its own failure summary, exactly once
    commands::install::run(cli.verbose)
}
