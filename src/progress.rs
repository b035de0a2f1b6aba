//! Progress bar display for downloads

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for a single file download
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    /// Create a progress bar for a download of `total_bytes` (0 = unknown size)
    pub fn new(display_name: &str, total_bytes: u64) -> Self {
        let bar = if total_bytes > 0 {
            let style = ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            let bar = ProgressBar::new(total_bytes);
            bar.set_style(style);
            bar
        } else {
            let style = ProgressStyle::default_spinner()
                .template("{spinner} {bytes} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            let bar = ProgressBar::new_spinner();
            bar.set_style(style);
            bar
        };
        bar.set_message(display_name.to_string());
        Self { bar }
    }

    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
