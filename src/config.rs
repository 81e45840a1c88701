use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{error::UrlInvalidError, navigator::NavigationTimings, ratelimit::PolitenessDelay};

pub const ENV_PREFIX: &str = "QUICKET_";
pub const DEFAULT_BASE_URL: &str = "https://www.quicket.co.za/events/";
pub const DEFAULT_DIAGNOSTICS_DIR: &str = "error_screenshots";
pub const DEFAULT_LOG_FILE: &str = "scraper.log";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_diagnostics_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DIAGNOSTICS_DIR)
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Optional `QUICKET_*` env vars. Everything has a default.
#[derive(Debug, Deserialize)]
pub struct ScrapingEnv {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_diagnostics_dir")]
    pub diagnostics_dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub base_url: String,
    pub diagnostics_dir: PathBuf,
    pub log_file: PathBuf,
    pub user_agent: String,
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_env(ScrapingEnv::load_from_env()?)
    }

    pub fn from_env(env: ScrapingEnv) -> anyhow::Result<Self> {
        let base_url = env.base_url.trim().to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(UrlInvalidError(base_url))
                .context("QUICKET_BASE_URL must be an http(s) URL");
        }
        Ok(Self {
            base_url,
            diagnostics_dir: env.diagnostics_dir,
            log_file: env.log_file,
            user_agent: env.user_agent,
        })
    }
}

/// How the browser itself is started.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agent: String,
    pub window_size: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: default_user_agent(),
            window_size: (1920, 1080),
        }
    }
}

/// Knobs of one scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub base_url: String,
    pub max_pages: u32,
    pub initial_load_timeout: Duration,
    pub extraction_attempts: u32,
    pub retry_settle: Duration,
    pub politeness: PolitenessDelay,
    pub navigation: NavigationTimings,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_pages: 10,
            initial_load_timeout: Duration::from_secs(30),
            extraction_attempts: 3,
            retry_settle: Duration::from_secs(2),
            politeness: PolitenessDelay::default(),
            navigation: NavigationTimings::default(),
        }
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
