//! Store package-index lookup (the primary source path)
//!
//! The lookup service parses vendor package-metadata pages and answers with an
//! HTML fragment whose anchors point at direct package URLs. It returns
//! exactly the right regional/ring build, but it is a third-party service that
//! can go down, which is why every dependency also carries an alternate
//! source (see `context::AlternateSource`).

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Result, WingstrapError};
use crate::net::HttpClient;

/// Package-index lookup endpoint
pub const STORE_API_URL: &str = "https://store.rg-adguard.net/api/GetFiles";

/// Distribution channel to request from the lookup service. Runs only use
/// `Retail`, but the service accepts all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ring {
    #[allow(dead_code)]
    Fast,
    #[allow(dead_code)]
    Slow,
    #[allow(dead_code)]
    Rp,
    Retail,
}

impl Ring {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ring::Fast => "Fast",
            Ring::Slow => "Slow",
            Ring::Rp => "RP",
            Ring::Retail => "Retail",
        }
    }
}

/// One structured lookup request
#[derive(Debug, Clone)]
pub struct StoreQuery {
    /// Identifier kind understood by the service (`PackageFamilyName`,
    /// `ProductId`, `url`, `CategoryId`)
    pub kind: &'static str,
    /// The identifier itself, e.g. a package family name
    pub identifier: String,
    pub ring: Ring,
    pub lang: String,
}

impl StoreQuery {
    /// Lookup by package family name on the retail ring
    pub fn family(identifier: impl Into<String>) -> Self {
        Self {
            kind: "PackageFamilyName",
            identifier: identifier.into(),
            ring: Ring::Retail,
            lang: "en-US".to_string(),
        }
    }
}

/// Pull candidate links out of the service's HTML fragment: the anchor text
/// (the package file name) paired with its `href`
pub fn extract_links(html: &str) -> Vec<(String, String)> {
    static HREF_RE: OnceLock<Regex> = OnceLock::new();
    let re = HREF_RE
        .get_or_init(|| Regex::new(r#"<a\s+[^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#).expect("valid href regex"));
    re.captures_iter(html)
        .map(|c| (c[2].trim().to_string(), c[1].to_string()))
        .collect()
}

/// Filter the fragment's anchors by package file name, first match wins
pub fn select_package_url(html: &str, name_pattern: &Regex) -> Option<String> {
    extract_links(html)
        .into_iter()
        .find(|(name, _)| name_pattern.is_match(name))
        .map(|(_, href)| href)
}

/// Query the lookup service and return the direct download URL of the first
/// package whose name matches `name_pattern`
pub fn resolve_package_url(
    client: &HttpClient,
    query: &StoreQuery,
    name_pattern: &Regex,
) -> Result<String> {
    let form = [
        ("type", query.kind),
        ("url", query.identifier.as_str()),
        ("ring", query.ring.as_str()),
        ("lang", query.lang.as_str()),
    ];
    let html = client
        .post_form(STORE_API_URL, &form)
        .map_err(|e| WingstrapError::StoreLookupFailed {
            identifier: query.identifier.clone(),
            reason: e.to_string(),
        })?;

    select_package_url(&html, name_pattern).ok_or_else(|| WingstrapError::NoMatchingPackage {
        identifier: query.identifier.clone(),
        pattern: name_pattern.as_str().to_string(),
    })
}
