//! HTTP client for release metadata, store lookups and package downloads
//!
//! A thin wrapper around a blocking `reqwest` client. All calls are
//! synchronous; no retry loop and no explicit timeout beyond the client's
//! defaults, matching the tool's single-shot nature.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::error::{Result, WingstrapError};
use crate::progress::DownloadProgress;

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

const USER_AGENT: &str = concat!("wingstrap/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client shared by the resolvers and the downloader
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WingstrapError::DownloadFailed {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// GET a JSON document and deserialize it
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| WingstrapError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WingstrapError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().map_err(|e| WingstrapError::DownloadFailed {
            url: url.to_string(),
            reason: format!("invalid JSON response: {e}"),
        })
    }

    /// POST a form-encoded body and return the response text
    pub fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        let response =
            self.client
                .post(url)
                .form(form)
                .send()
                .map_err(|e| WingstrapError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WingstrapError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|e| WingstrapError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Download a URL to a local file, streaming in chunks with a progress bar.
    ///
    /// Never buffers the whole response in memory.
    pub fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response =
            self.client
                .get(url)
                .send()
                .map_err(|e| WingstrapError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WingstrapError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_size = response.content_length().unwrap_or(0);
        let display_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let progress = DownloadProgress::new(&display_name, total_size);

        let mut file = File::create(dest)?;
        let mut buffer = [0u8; STREAM_BUFFER_SIZE];
        loop {
            let bytes_read = match response.read(&mut buffer) {
                Ok(n) => n,
                Err(e) => {
                    progress.abandon();
                    return Err(WingstrapError::DownloadFailed {
                        url: url.to_string(),
                        reason: format!("read failed: {e}"),
                    });
                }
            };
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])?;
            progress.advance(bytes_read as u64);
        }

        progress.finish();
        Ok(())
    }
}
