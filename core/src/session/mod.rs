//! Per-user dashboard session.
//!
//! A session owns one filter store and the views derived from it. Each UI
//! event commits at most one filter change, rebuilds only the views that
//! depend on what changed, and returns the signals produced along the way.
//! The dataset and boundaries are shared read-only between sessions.

#[cfg(test)]
mod session_tests;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::dataset::Dataset;
use crate::filter::{FilterChange, FilterListener, FilterState, FilterStore};
use crate::geo::BoundaryIndex;
use crate::signals::{DashboardSignal, SignalHandler};
use crate::views::{DashboardViews, ViewKind, apply_highlights};
use airwatch_types::{DashboardConfig, DateRange, UiEvent};

pub struct DashboardSession {
    dataset: Arc<Dataset>,
    boundaries: Arc<BoundaryIndex>,
    config: DashboardConfig,
    store: FilterStore,
    views: DashboardViews,
    handlers: Vec<Box<dyn SignalHandler>>,
}

/// Initial filters: the configured pollutant over the dataset's full date span.
fn initial_filters(dataset: &Dataset, config: &DashboardConfig) -> FilterState {
    let range = dataset
        .date_bounds()
        .unwrap_or_else(|| DateRange::new(NaiveDate::MIN, NaiveDate::MAX));
    FilterState::new(config.default_pollutant.clone(), range)
}

impl DashboardSession {
    pub fn new(dataset: Arc<Dataset>, boundaries: Arc<BoundaryIndex>, config: DashboardConfig) -> Self {
        let filters = initial_filters(&dataset, &config);
        Self::with_filters(dataset, boundaries, config, filters)
    }

    /// Start from explicit filters instead of the configured defaults.
    pub fn with_filters(
        dataset: Arc<Dataset>,
        boundaries: Arc<BoundaryIndex>,
        config: DashboardConfig,
        filters: FilterState,
    ) -> Self {
        let mut session = Self {
            dataset,
            boundaries,
            config,
            store: FilterStore::new(filters),
            views: DashboardViews::default(),
            handlers: Vec::new(),
        };
        let mut signals = Vec::new();
        session.refresh(&ViewKind::ALL, &mut signals);
        tracing::debug!(signals = signals.len(), "Dashboard session initialised");
        session
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    pub fn filters(&self) -> Arc<FilterState> {
        self.store.snapshot()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of committed filter changes since the session started.
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn subscribe(&mut self, listener: Box<dyn FilterListener>) {
        self.store.subscribe(listener);
    }

    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler>) {
        self.handlers.push(handler);
    }

    /// Apply one UI event and return the signals it produced.
    ///
    /// An event that leaves the filters unchanged produces no signals.
    pub fn apply(&mut self, event: UiEvent) -> Vec<DashboardSignal> {
        let change = match event {
            UiEvent::SetPollutant { pollutant } => self.store.set_pollutant(&pollutant),
            UiEvent::SetRegions { regions } => self.store.set_regions(regions),
            UiEvent::SetCountries { countries } => self.store.set_countries(countries),
            UiEvent::SetDateRange { start, end } => self.store.set_date_range(DateRange::new(start, end)),
            UiEvent::SetMonthRange {
                start_year,
                start_month,
                end_year,
                end_month,
            } => match DateRange::from_months(start_year, start_month, end_year, end_month) {
                Some(range) => self.store.set_date_range(range),
                None => {
                    tracing::warn!(start_year, start_month, end_year, end_month, "Ignoring invalid month range");
                    None
                }
            },
            UiEvent::MapClick { country } => self.store.toggle_selected(&country),
        };

        let mut signals = Vec::new();
        if let Some(change) = change {
            self.process_change(change, &mut signals);
        }

        for handler in &mut self.handlers {
            handler.handle_signals(&signals, &self.views);
        }
        signals
    }

    fn process_change(&mut self, change: FilterChange, signals: &mut Vec<DashboardSignal>) {
        signals.push(DashboardSignal::FiltersChanged {
            change: change.clone(),
            version: self.store.version(),
        });

        match &change {
            FilterChange::Selection { country, state } => {
                apply_highlights(&mut self.views.map, &self.store.current().selected_countries);
                signals.push(DashboardSignal::SelectionToggled {
                    country: country.clone(),
                    state: *state,
                });
            }
            FilterChange::DateRange => {
                let range = self.store.current().date_range;
                if !range.is_valid() {
                    signals.push(DashboardSignal::InvalidDateRange { range });
                }
                self.refresh(ViewKind::affected_by(&change), signals);
            }
            _ => self.refresh(ViewKind::affected_by(&change), signals),
        }
    }

    /// Rebuild `kinds`. The ranking goes first so a new leader can update the
    /// country filter before the country-scoped views are built.
    fn refresh(&mut self, kinds: &[ViewKind], signals: &mut Vec<DashboardSignal>) {
        let mut pending: Vec<ViewKind> = kinds.to_vec();
        let mut rebuilt: Vec<ViewKind> = Vec::with_capacity(pending.len());

        if let Some(pos) = pending.iter().position(|k| *k == ViewKind::TopN) {
            pending.remove(pos);
            let previous = self.views.top_n.leader.clone();
            self.rebuild(ViewKind::TopN);
            rebuilt.push(ViewKind::TopN);

            let leader = self.views.top_n.leader.clone();
            if leader != previous
                && let Some(country) = leader
            {
                signals.push(DashboardSignal::DefaultCountry {
                    country: country.clone(),
                });
                if self.config.follow_top_country
                    && let Some(change) = self.store.set_countries([country])
                {
                    for kind in ViewKind::affected_by(&change) {
                        if !pending.contains(kind) {
                            pending.push(*kind);
                        }
                    }
                    signals.push(DashboardSignal::FiltersChanged {
                        change,
                        version: self.store.version(),
                    });
                }
            }
        }

        for kind in pending {
            self.rebuild(kind);
            rebuilt.push(kind);
        }

        for kind in &rebuilt {
            if self.views.is_empty(*kind) {
                signals.push(DashboardSignal::EmptyResult { view: *kind });
            }
        }
        if rebuilt.contains(&ViewKind::Map) {
            signals.extend(
                self.views
                    .map
                    .unmatched
                    .iter()
                    .map(|country| DashboardSignal::MissingJoinKey {
                        country: country.clone(),
                    }),
            );
        }

        tracing::debug!(views = ?rebuilt, version = self.store.version(), "Views recomputed");
        signals.push(DashboardSignal::ViewsRecomputed { views: rebuilt });
    }

    fn rebuild(&mut self, kind: ViewKind) {
        let filters = self.store.snapshot();
        self.views
            .rebuild(kind, &self.dataset, &filters, &self.boundaries, &self.config);
    }
}
