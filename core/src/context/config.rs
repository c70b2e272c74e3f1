//! Dashboard configuration
//!
//! Re-exports the shared config type from airwatch-types and provides
//! platform defaults plus persistence through confy.

use std::path::Path;

pub use airwatch_types::{DashboardConfig, MapColorMode, TrendMetric};
use airwatch_types::{DEFAULT_ROLLING_HALF_WIDTH, DEFAULT_TOP_N_LIMIT};

use super::ConfigError;

const APP_NAME: &str = "airwatch";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

fn default_data_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("airwatch").join("world_air_quality.csv"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// DashboardConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for DashboardConfig persistence
pub trait DashboardConfigExt: Sized {
    fn load() -> Self;
    fn load_with_defaults() -> Self;
    fn load_from_path(path: &Path) -> Result<Self, ConfigError>;
    fn save(self) -> Result<(), ConfigError>;
    /// Replace zero limits with their defaults.
    fn normalized(self) -> Self;
}

impl DashboardConfigExt for DashboardConfig {
    fn load() -> Self {
        match confy::load::<DashboardConfig>(APP_NAME, CONFIG_NAME) {
            Ok(config) if !config.data_path.is_empty() => config.normalized(),
            Ok(config) => DashboardConfig {
                data_path: default_data_path(),
                ..config
            }
            .normalized(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::load_with_defaults()
            }
        }
    }

    /// Load with platform-specific defaults (used when no config file exists)
    fn load_with_defaults() -> Self {
        DashboardConfig::with_data_path(default_data_path())
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DashboardConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.normalized())
    }

    fn save(self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn normalized(mut self) -> Self {
        if self.top_n_limit == 0 {
            self.top_n_limit = DEFAULT_TOP_N_LIMIT;
        }
        if self.rolling_half_width == 0 {
            self.rolling_half_width = DEFAULT_ROLLING_HALF_WIDTH;
        }
        self
    }
}
