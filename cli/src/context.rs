use std::path::Path;
use std::sync::Arc;

use airwatch_core::{
    BoundaryIndex, DashboardConfig, DashboardConfigExt, DashboardSession, DashboardSignal,
    DashboardViews, Dataset, LoadOptions, SignalHandler,
};

/// Holds all state for the CLI.
/// The dataset and boundaries are loaded once and shared with the session.
pub struct CliContext {
    pub config: DashboardConfig,
    dataset: Option<Arc<Dataset>>,
    boundaries: Arc<BoundaryIndex>,
    /// None until a dataset is loaded
    session: Option<DashboardSession>,
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CliContext {
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::load())
    }

    pub fn with_config(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            boundaries: Arc::new(BoundaryIndex::empty()),
            session: None,
        }
    }

    /// Load a dataset (and optionally boundaries) and start a fresh session.
    /// Falls back to the configured paths when none are given.
    pub fn load(&mut self, data_path: Option<&str>, boundaries_path: Option<&str>) -> Result<Arc<Dataset>, String> {
        let data_path = data_path.unwrap_or(self.config.data_path.as_str());
        if data_path.is_empty() {
            return Err("no dataset path given or configured".to_string());
        }
        let dataset = Dataset::load(Path::new(data_path), &LoadOptions::default()).map_err(|e| e.to_string())?;

        let boundaries_path = boundaries_path.or(self.config.boundaries_path.as_deref());
        let boundaries = match boundaries_path {
            Some(path) => BoundaryIndex::load(Path::new(path)).map_err(|e| e.to_string())?,
            None => BoundaryIndex::empty(),
        };

        let dataset = Arc::new(dataset);
        self.boundaries = Arc::new(boundaries);
        self.dataset = Some(Arc::clone(&dataset));
        self.reset_session();
        Ok(dataset)
    }

    /// Start a new session over the loaded dataset with the current config.
    pub fn reset_session(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let mut session = DashboardSession::new(
            Arc::clone(dataset),
            Arc::clone(&self.boundaries),
            self.config.clone(),
        );
        session.add_signal_handler(Box::new(SignalLogger));
        self.session = Some(session);
    }

    pub fn session(&self) -> Result<&DashboardSession, String> {
        self.session
            .as_ref()
            .ok_or_else(|| "no dataset loaded, run `load` first".to_string())
    }

    pub fn session_mut(&mut self) -> Result<&mut DashboardSession, String> {
        self.session
            .as_mut()
            .ok_or_else(|| "no dataset loaded, run `load` first".to_string())
    }
}

/// Forwards session signals to the log.
struct SignalLogger;

impl SignalHandler for SignalLogger {
    fn handle_signal(&mut self, signal: &DashboardSignal, _views: &DashboardViews) {
        match signal {
            DashboardSignal::InvalidDateRange { range } => {
                tracing::warn!(start = %range.start, end = %range.end, "Date range is inverted")
            }
            DashboardSignal::MissingJoinKey { country } => {
                tracing::debug!(%country, "Country has no boundary feature")
            }
            other => tracing::debug!(signal = ?other, "Dashboard signal"),
        }
    }
}
