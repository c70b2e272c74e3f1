use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use super::FilterState;
use crate::selection::SelectionState;
use airwatch_types::DateRange;

/// What a single setter call changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FilterChange {
    Pollutant,
    Regions,
    Countries,
    DateRange,
    Selection {
        country: String,
        state: SelectionState,
    },
}

/// Subscriber notified after every committed filter change.
pub trait FilterListener {
    fn on_filter_change(&mut self, change: &FilterChange, state: &Arc<FilterState>);
}

/// Owns the current filter snapshot. Setters never edit a snapshot in place;
/// they commit a new one, so consumers holding an `Arc` never observe a
/// half-applied update.
pub struct FilterStore {
    current: Arc<FilterState>,
    version: u64,
    listeners: Vec<Box<dyn FilterListener>>,
}

impl FilterStore {
    pub fn new(initial: FilterState) -> Self {
        Self {
            current: Arc::new(initial),
            version: 0,
            listeners: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> Arc<FilterState> {
        Arc::clone(&self.current)
    }

    pub fn current(&self) -> &FilterState {
        &self.current
    }

    /// Incremented once per committed change
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn subscribe(&mut self, listener: Box<dyn FilterListener>) {
        self.listeners.push(listener);
    }

    pub fn set_pollutant(&mut self, pollutant: &str) -> Option<FilterChange> {
        let next = FilterState {
            pollutant: pollutant.to_string(),
            ..(*self.current).clone()
        };
        self.commit(next, FilterChange::Pollutant)
    }

    pub fn set_regions<I, S>(&mut self, regions: I) -> Option<FilterChange>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let regions: BTreeSet<String> = regions.into_iter().map(Into::into).collect();
        let next = FilterState {
            regions,
            ..(*self.current).clone()
        };
        self.commit(next, FilterChange::Regions)
    }

    pub fn set_countries<I, S>(&mut self, countries: I) -> Option<FilterChange>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let countries: BTreeSet<String> = countries.into_iter().map(Into::into).collect();
        let next = FilterState {
            countries,
            ..(*self.current).clone()
        };
        self.commit(next, FilterChange::Countries)
    }

    /// Inverted ranges are accepted; they make every view empty.
    pub fn set_date_range(&mut self, date_range: DateRange) -> Option<FilterChange> {
        if !date_range.is_valid() {
            tracing::warn!(start = %date_range.start, end = %date_range.end, "Date range start is after end");
        }
        let next = FilterState {
            date_range,
            ..(*self.current).clone()
        };
        self.commit(next, FilterChange::DateRange)
    }

    /// Flip a country's map selection. Always commits.
    pub fn toggle_selected(&mut self, country: &str) -> Option<FilterChange> {
        let mut next = (*self.current).clone();
        let state = next.selected_countries.toggle(country);
        self.commit(
            next,
            FilterChange::Selection {
                country: country.to_string(),
                state,
            },
        )
    }

    fn commit(&mut self, next: FilterState, change: FilterChange) -> Option<FilterChange> {
        if next == *self.current {
            return None;
        }
        self.current = Arc::new(next);
        self.version += 1;
        tracing::debug!(?change, version = self.version, "Filter state committed");
        for listener in &mut self.listeners {
            listener.on_filter_change(&change, &self.current);
        }
        Some(change)
    }
}
