use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Local;
use log::{info, warn};

use crate::BrowserSession;

/// How much raw page content is logged when a run fails.
pub const PAGE_DUMP_CHARS: usize = 1000;

/// Directory of failure screenshots for one run.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    dir: PathBuf,
}

impl Diagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory, or empties it if it already exists.
    pub fn prepare(&self) -> anyhow::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("failed to create {}", self.dir.display()))?;
            info!("Created diagnostics directory: {}", self.dir.display());
            return Ok(());
        }

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read {}", self.dir.display()))?;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Error reading entry in {}: {e}", self.dir.display());
                    continue;
                }
            };
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                warn!("Error clearing file {}: {e}", path.display());
            }
        }
        info!("Cleared existing files in diagnostics directory: {}", self.dir.display());
        Ok(())
    }

    /// Screenshot path for `label`, e.g. `timeout_page_3_20250314T183000.png`.
    pub fn screenshot_path(&self, label: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%dT%H%M%S");
        self.dir.join(format!("{label}_{stamp}.png"))
    }

    /// Saves a screenshot. Never fails the caller.
    pub async fn capture<S: BrowserSession>(&self, session: &S, label: &str) {
        let path = self.screenshot_path(label);
        match session.screenshot(&path).await {
            Ok(()) => info!("Saved diagnostic screenshot to {}", path.display()),
            Err(e) => warn!("Could not save screenshot {}: {e}", path.display()),
        }
    }
}

/// Cuts `content` to at most `max_chars` characters.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
