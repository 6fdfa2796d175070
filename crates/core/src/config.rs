//! User configuration.
//!
//! Settings come from `<config dir>/fleet/config.toml`, overridden by
//! `FLEET_*` environment variables (for example `FLEET_DATA_FILE`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Directory under the platform config dir holding our settings.
pub const CONFIG_DIR: &str = "fleet";
/// File name of the settings file.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FLEET";

const DEFAULT_CONFIG: &str = r#"# Fleet manager settings.
# Any key can be overridden from the environment, e.g. FLEET_DATA_FILE=/tmp/fleet.csv

# File used by save and load.
data_file = "fleet.csv"

# Distance in km suggested when starting journeys.
default_distance = 100.0

# Litres suggested when refuelling the fleet.
default_refuel = 50.0
"#;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fleet file used by save and load.
    pub data_file: PathBuf,
    /// Pre-filled journey distance in km.
    pub default_distance: f64,
    /// Pre-filled refuel amount in litres.
    pub default_refuel: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("fleet.csv"),
            default_distance: 100.0,
            default_refuel: 50.0,
        }
    }
}

impl AppConfig {
    /// Load settings from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load settings from `path` (which may be absent) plus environment
    /// overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse configuration {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_distance.is_nan() || self.default_distance <= 0.0 {
            bail!("default_distance must be positive");
        }
        if self.default_refuel.is_nan() || self.default_refuel <= 0.0 {
            bail!("default_refuel must be positive");
        }
        if self.data_file.as_os_str().is_empty() {
            bail!("data_file must not be empty");
        }
        Ok(())
    }
}

/// Default location of the settings file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a commented default settings file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Write the default settings to `path` unless a file is already there.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
