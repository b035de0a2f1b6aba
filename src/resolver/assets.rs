//! Release-asset resolution against the GitHub releases API
//!
//! Used for the main package (winget itself) and for this tool's own update
//! check. There is no fallback behind this resolver: a failed metadata fetch
//! or an empty match set aborts the run.

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, WingstrapError};
use crate::net::HttpClient;

/// Latest-release metadata, as returned by `releases/latest`
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable asset attached to a release
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

fn releases_latest_url(owner: &str, repo: &str) -> String {
    format!("https://api.github.com/repos/{owner}/{repo}/releases/latest")
}

/// Fetch the latest-release metadata for `owner/repo`
pub fn latest_release(client: &HttpClient, owner: &str, repo: &str) -> Result<Release> {
    let url = releases_latest_url(owner, repo);
    client
        .get_json(&url)
        .map_err(|e| WingstrapError::ReleaseLookupFailed {
            repo: format!("{owner}/{repo}"),
            reason: e.to_string(),
        })
}

/// Pick the first asset whose file name matches `pattern`.
///
/// Zero matches is a resolution failure.
pub fn resolve_asset<'a>(
    release: &'a Release,
    repo: &str,
    pattern: &Regex,
) -> Result<&'a ReleaseAsset> {
    release
        .assets
        .iter()
        .find(|asset| pattern.is_match(&asset.name))
        .ok_or_else(|| WingstrapError::NoMatchingAsset {
            repo: repo.to_string(),
            pattern: pattern.as_str().to_string(),
        })
}
