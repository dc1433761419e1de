use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{evaluator::WarningPolicy, model::Coordinate};

/// Upper bound Open-Meteo accepts for `forecast_days`.
pub const MAX_FORECAST_DAYS: u32 = 16;

/// Settings stored on disk. Loaded once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the forecast API; `forecast` is appended to it.
    pub api_url: String,

    pub forecast_days: u32,

    /// Alert when an hour in the window reaches this probability (inclusive).
    pub warning_threshold_percent: f64,

    /// Number of hours, starting at the first future hour, to scan.
    pub warning_hours: u32,

    /// Delay between two periodic checks.
    pub warning_frequency_secs: u64,

    /// Default location for the periodic check.
    pub latitude: f64,
    pub longitude: f64,

    pub request_timeout_secs: u64,

    /// Where log records are written; defaults to the platform data directory.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "https://api.open-meteo.com/v1/".to_string(),
            forecast_days: 2,
            warning_threshold_percent: 50.0,
            warning_hours: 5,
            warning_frequency_secs: 600,
            latitude: 52.52,
            longitude: 13.41,
            request_timeout_secs: 10,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the platform config file when `None`.
    ///
    /// An explicit path must exist; the platform file may be missing on first
    /// run, in which case defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_file_path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                Self::load_from(&path)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Log file to use: the configured one, or one in the platform data directory.
    pub fn log_file_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_local_dir().join("weather-alert.log")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast_days) {
            bail!(
                "forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {}",
                self.forecast_days
            );
        }
        if !self.warning_threshold_percent.is_finite()
            || !(0.0..=100.0).contains(&self.warning_threshold_percent)
        {
            bail!(
                "warning_threshold_percent must be between 0 and 100, got {}",
                self.warning_threshold_percent
            );
        }
        if self.warning_frequency_secs == 0 {
            bail!("warning_frequency_secs must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            bail!("latitude and longitude must be finite numbers");
        }
        Ok(())
    }

    pub fn default_coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn warning_policy(&self) -> WarningPolicy {
        WarningPolicy {
            threshold_percent: self.warning_threshold_percent,
            hours: self.warning_hours as usize,
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.warning_frequency_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-alert", "weather-alert")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
