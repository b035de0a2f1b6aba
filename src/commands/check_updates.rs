//! Update check against wingstrap's own release metadata

use console::Style;
use semver::Version;

use crate::error::{Result, WingstrapError};
use crate::net::HttpClient;
use crate::resolver::assets;

const SELF_OWNER: &str = "wingstrap";
const SELF_REPO: &str = "wingstrap";

fn parse_version(raw: &str) -> Result<Version> {
    Version::parse(raw.trim_start_matches('v')).map_err(|e| WingstrapError::InvalidVersion {
        version: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Query the latest release and print a comparison against the build version
pub fn run() -> Result<()> {
    let current = parse_version(env!("CARGO_PKG_VERSION"))?;

    let client = HttpClient::new()?;
    let release = assets::latest_release(&client, SELF_OWNER, SELF_REPO)?;
    let latest = parse_version(&release.tag_name)?;

    println!("wingstrap {current} (latest release: {latest})");
    if latest > current {
        println!(
            "{} a newer release is available{}",
            Style::new().yellow().bold().apply_to("update:"),
            release
                .published_at
                .as_deref()
                .map(|date| format!(" (published {date})"))
                .unwrap_or_default()
        );
        println!(
            "  https://github.com/{SELF_OWNER}/{SELF_REPO}/releases/tag/{}",
            release.tag_name
        );
    } else {
        println!("{}", Style::new().green().apply_to("wingstrap is up to date"));
    }
    Ok(())
}
