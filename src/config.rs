use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize, Clone)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
pub struct ForecastParameters {
    pub interval_seconds: u64,
    pub output_path: String,
}

#[derive(Deserialize)]
pub struct GriddedParameters {
    pub enabled: bool,
    pub cache_dir: String,
    pub interval_seconds: u64,
}

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub forecast: ForecastParameters,
    pub gridded: GriddedParameters,
    pub locations: Vec<Location>,
}

/// Loads the configuration file and returns a struct with all configuration
/// items. Missing or malformed entries are fatal since they indicate a
/// deployment mistake rather than a transient condition.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.locations.is_empty() {
        return Err(ConfigError::from("no locations configured"));
    }

    Ok(config)
}
