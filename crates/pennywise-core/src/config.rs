//! Runtime configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, else the override in the data dir
//!    (~/.local/share/pennywise/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional. Missing keys keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pennywise.toml");

/// Longest accepted trailing window (about a century)
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Request-time forecasting windows
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Trailing window for prediction features
    pub lookback_days: i64,
    /// How many recent expenses the anomaly scan looks at
    pub anomaly_sample: i64,
    /// Trailing window for the savings rate
    pub savings_rate_days: i64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_days: 120,
            anomaly_sample: 50,
            savings_rate_days: 30,
        }
    }
}

/// Batch training hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub seed: u64,
    pub category_trees: usize,
    pub savings_trees: usize,
    pub savings_max_depth: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            category_trees: 100,
            savings_trees: 50,
            savings_max_depth: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestConfig {
    /// Surplus substituted when the savings model has no usable prediction
    pub fallback_surplus: Option<f64>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub models_dir: PathBuf,
    pub forecast: ForecastConfig,
    pub training: TrainingConfig,
    pub invest: InvestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            forecast: ForecastConfig::default(),
            training: TrainingConfig::default(),
            invest: InvestConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration (explicit path, then data dir override, then embedded default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", path.display(), e))
            })?,
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => fs::read_to_string(&default_path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pennywise").join("config.toml"))
}

/// Default artifact directory
pub fn default_models_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pennywise").join("models"))
        .unwrap_or_else(|| PathBuf::from("models"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    models_dir: Option<PathBuf>,
    forecast: Option<RawForecast>,
    training: Option<RawTraining>,
    invest: Option<RawInvest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawForecast {
    lookback_days: Option<i64>,
    anomaly_sample: Option<i64>,
    savings_rate_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTraining {
    seed: Option<u64>,
    category_trees: Option<usize>,
    savings_trees: Option<usize>,
    savings_max_depth: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInvest {
    fallback_surplus: Option<f64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(dir) = raw.models_dir {
        config.models_dir = dir;
    }

    if let Some(forecast) = raw.forecast {
        if let Some(days) = forecast.lookback_days {
            config.forecast.lookback_days = days;
        }
        if let Some(sample) = forecast.anomaly_sample {
            config.forecast.anomaly_sample = sample;
        }
        if let Some(days) = forecast.savings_rate_days {
            config.forecast.savings_rate_days = days;
        }
    }

    if let Some(training) = raw.training {
        if let Some(seed) = training.seed {
            config.training.seed = seed;
        }
        if let Some(n) = training.category_trees {
            config.training.category_trees = n;
        }
        if let Some(n) = training.savings_trees {
            config.training.savings_trees = n;
        }
        if let Some(depth) = training.savings_max_depth {
            config.training.savings_max_depth = depth;
        }
    }

    if let Some(invest) = raw.invest {
        config.invest.fallback_surplus = invest.fallback_surplus;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let forecast = &config.forecast;
    if forecast.lookback_days <= 0 || forecast.anomaly_sample <= 0 || forecast.savings_rate_days <= 0 {
        return Err(Error::Config(
            "forecast windows must be positive".to_string(),
        ));
    }
    if forecast.lookback_days > MAX_WINDOW_DAYS || forecast.savings_rate_days > MAX_WINDOW_DAYS {
        return Err(Error::Config(format!(
            "forecast windows may span at most {} days",
            MAX_WINDOW_DAYS
        )));
    }
    if config.training.category_trees == 0 || config.training.savings_trees == 0 {
        return Err(Error::Config("forests need at least one tree".to_string()));
    }
    if config.training.savings_max_depth == 0 {
        return Err(Error::Config("savings_max_depth must be at least 1".to_string()));
    }
    Ok(())
}
