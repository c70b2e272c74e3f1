mod config;
mod error;
mod interner;

pub use config::{DashboardConfig, DashboardConfigExt, MapColorMode, TrendMetric};
pub use error::ConfigError;
pub use interner::{IStr, intern, lookup, resolve};
