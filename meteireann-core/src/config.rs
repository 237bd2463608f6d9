use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::{Coordinates, Region};

pub const FORECAST_API_URL: &str =
    "http://metwdb-openaccess.ichec.ie/metno-wdb2ts/locationforecast";
pub const WARNING_API_URL: &str = "https://www.met.ie/Open_Data/json/warning_";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// region = "EI07"
///
/// [location]
/// latitude = 53.35
/// longitude = -6.26
/// altitude = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Warning feed region; the whole country when absent.
    pub region: Option<Region>,

    /// Override for the forecast endpoint.
    pub forecast_url: Option<String>,

    /// Override for the warning endpoint prefix. The region code and `.json`
    /// are appended to it.
    pub warning_url: Option<String>,

    pub timeout_secs: Option<u64>,

    /// Forecast location; Malin Head when absent.
    pub location: Option<Coordinates>,
}

impl Config {
    pub fn location(&self) -> Coordinates {
        self.location.unwrap_or_default()
    }

    pub fn region(&self) -> Region {
        self.region.clone().unwrap_or_default()
    }

    pub fn forecast_url(&self) -> &str {
        self.forecast_url.as_deref().unwrap_or(FORECAST_API_URL)
    }

    pub fn warning_url(&self) -> &str {
        self.warning_url.as_deref().unwrap_or(WARNING_API_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn set_location(&mut self, location: Coordinates) -> Result<()> {
        location.validate().context("Refusing to store location")?;
        self.location = Some(location);
        Ok(())
    }

    pub fn set_region(&mut self, region: Region) {
        self.region = Some(region);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(location) = &cfg.location {
            location
                .validate()
                .with_context(|| format!("Invalid location in config file: {}", path.display()))?;
        }

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("ie", "meteireann", "meteireann-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
