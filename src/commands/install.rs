//! The default command: the full bootstrap run
//!
//! Builds the immutable run context, wires the real provider, engine and
//! environment store into the orchestrator, and prints the terminal banner.
//! A failure prints the triggering step and error detail once, here, and the
//! process exits non-zero. Partially installed packages are left in place.

use std::env;
use std::process::ExitCode;

use console::Style;
use miette::Diagnostic;

use crate::arch::Architecture;
use crate::context::RunContext;
use crate::installer::AppxEngine;
use crate::orchestrator::{HttpProvider, Orchestrator, RunFailure, Step};
use crate::pathenv::SystemPathStore;
use crate::temp;

const ISSUES_URL: &str = "https://github.com/wingstrap/wingstrap/issues";

/// Run the full install.
///
/// A failure is reported here, once, and only the exit status travels back
/// to `main`.
pub fn run(verbose: bool) -> ExitCode {
    println!(
        "{} v{}",
        Style::new().bold().apply_to("wingstrap"),
        env!("CARGO_PKG_VERSION")
    );

    if verbose {
        print_diagnostics();
    }

    match bootstrap(verbose) {
        Ok(()) => {
            println!();
            println!(
                "{}",
                Style::new().green().bold().apply_to(
                    "winget installed successfully. Open a new terminal and run 'winget --version'."
                )
            );
            ExitCode::SUCCESS
        }
        Err(failure) => {
            print_failure(&failure);
            ExitCode::FAILURE
        }
    }
}

/// The state machine entry: architecture detection, then the sequenced steps
fn bootstrap(verbose: bool) -> std::result::Result<(), RunFailure> {
    let arch = Architecture::detect().map_err(|error| RunFailure {
        step: Step::DetectArch,
        error,
    })?;
    println!(
        "{} detected architecture: {arch}",
        Style::new().green().bold().apply_to("=>")
    );

    let ctx = RunContext::new(arch, verbose).map_err(|error| RunFailure {
        step: Step::DetectArch,
        error,
    })?;
    let provider = HttpProvider::new().map_err(|error| RunFailure {
        step: Step::InstallRuntimeLib,
        error,
    })?;
    let engine = AppxEngine;
    let path_store = SystemPathStore;

    Orchestrator::new(&ctx, &provider, &engine, &path_store).run()
}

fn print_failure(failure: &RunFailure) {
    eprintln!();
    eprintln!(
        "{} wingstrap failed while {}",
        Style::new().red().bold().apply_to("error:"),
        failure.step.describe()
    );
    eprintln!("  {}", failure.error);
    if let Some(help) = failure.error.help() {
        eprintln!("  {} {}", Style::new().dim().apply_to("help:"), help);
    }
    eprintln!();
    eprintln!("If the problem persists, file an issue: {ISSUES_URL}");
}

fn print_diagnostics() {
    println!("Host diagnostics:");
    println!("  OS: {} ({})", env::consts::OS, env::consts::FAMILY);
    println!("  Compile target arch: {}", env::consts::ARCH);
    println!(
        "  PROCESSOR_ARCHITECTURE: {}",
        env::var("PROCESSOR_ARCHITECTURE").unwrap_or_else(|_| "<unset>".to_string())
    );
    println!("  Temp base: {}", temp::temp_dir_base().display());
    println!("  Version: {}", env!("CARGO_PKG_VERSION"));
}
