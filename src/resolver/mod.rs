//! Download-URL resolution for the three packages
//!
//! Two resolution styles: release-asset lookup against a GitHub-style
//! releases API (`assets`), and the primary/alternate store lookup protocol
//! (`store`).

pub mod assets;
pub mod store;

pub use assets::{Release, ReleaseAsset, resolve_asset};
pub use store::{Ring, StoreQuery, resolve_package_url};
