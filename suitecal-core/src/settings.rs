//! Site settings: where the feed config and availability records live.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `suitecal.toml` in the site root, then `SUITECAL_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_AVAILABILITY_DIR, DEFAULT_FEED_CONFIG_PATH, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_MONTHS_TO_SHOW,
};
use crate::error::{SuiteCalError, SuiteCalResult};

pub const SETTINGS_FILE_NAME: &str = "suitecal.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    pub feed_config: PathBuf,
    pub availability_dir: PathBuf,
    pub fetch_timeout_secs: u64,
    pub months_to_show: u32,

    #[serde(skip)]
    site_root: PathBuf,
}

impl SiteSettings {
    pub fn load(site_root: &Path) -> SuiteCalResult<Self> {
        let mut settings: SiteSettings = Config::builder()
            .set_default("feed_config", DEFAULT_FEED_CONFIG_PATH)
            .and_then(|b| b.set_default("availability_dir", DEFAULT_AVAILABILITY_DIR))
            .and_then(|b| b.set_default("fetch_timeout_secs", DEFAULT_FETCH_TIMEOUT.as_secs() as i64))
            .and_then(|b| b.set_default("months_to_show", i64::from(DEFAULT_MONTHS_TO_SHOW)))
            .map_err(|e| SuiteCalError::Config(e.to_string()))?
            .add_source(File::from(site_root.join(SETTINGS_FILE_NAME)).required(false))
            .add_source(Environment::with_prefix("SUITECAL"))
            .build()
            .map_err(|e| SuiteCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SuiteCalError::Config(e.to_string()))?;

        settings.site_root = site_root.to_path_buf();
        Ok(settings)
    }

    pub fn feed_config_path(&self) -> PathBuf {
        self.resolve(&self.feed_config)
    }

    pub fn availability_dir(&self) -> PathBuf {
        self.resolve(&self.availability_dir)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Expand `~` and anchor relative paths at the site root.
    fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        if expanded.is_absolute() {
            expanded
        } else {
            self.site_root.join(expanded)
        }
    }
}
