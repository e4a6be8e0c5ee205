use serde::{Deserialize, Serialize};
use crate::tasks::task_service::DEFAULT_TASK_TTL_SECS;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Failed to read analysis config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse analysis config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Tunables of the pixel classifier and the carbon estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Tonnes CO2e per mangrove pixel.
    pub mangrove_factor: f64,
    /// Tonnes CO2e per land pixel.
    pub land_factor: f64,
    pub pixels_per_hectare: f64,
    /// How far a channel must exceed the other two to claim the pixel.
    pub dominance_margin: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mangrove_factor: 0.015,
            land_factor: 0.003,
            pixels_per_hectare: 10_000.0,
            dominance_margin: 10,
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub upload_dir: PathBuf,
    pub result_dir: PathBuf,
    /// Seconds a finished task stays queryable.
    pub task_ttl_secs: i64,
    pub analysis: AnalysisConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value })?,
            None => 5000,
        };

        let task_ttl_secs = match lookup("TASK_TTL_SECS") {
            Some(value) => value
                .parse()
                .ok()
                .filter(|secs: &i64| *secs >= 0)
                .ok_or(ConfigError::InvalidValue { key: "TASK_TTL_SECS", value })?,
            None => DEFAULT_TASK_TTL_SECS,
        };

        let analysis = match lookup("ANALYSIS_CONFIG") {
            Some(path) => AnalysisConfig::load(Path::new(&path))?,
            None => AnalysisConfig::default(),
        };

        Ok(Self {
            port,
            upload_dir: lookup("UPLOAD_DIR").unwrap_or_else(|| "uploads".into()).into(),
            result_dir: lookup("RESULT_DIR").unwrap_or_else(|| "results".into()).into(),
            task_ttl_secs,
            analysis,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
