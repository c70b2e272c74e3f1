//! Signals emitted by a dashboard session after each UI event.
//!
//! Signals flow one way: from the filter store and views out to whoever
//! renders them. They describe what happened, never request changes.

use serde::Serialize;

use crate::filter::FilterChange;
use crate::selection::SelectionState;
use crate::views::{DashboardViews, ViewKind};
use airwatch_types::DateRange;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum DashboardSignal {
    /// A setter committed a new filter snapshot
    FiltersChanged { change: FilterChange, version: u64 },

    /// Views rebuilt for one event, in rebuild order
    ViewsRecomputed { views: Vec<ViewKind> },

    /// Top-ranked country changed. Consumed by the country filter when the
    /// session follows the leader.
    DefaultCountry { country: String },

    SelectionToggled { country: String, state: SelectionState },

    /// A rebuilt view has no rows under the current filters
    EmptyResult { view: ViewKind },

    /// Date range start is after its end; every view is empty
    InvalidDateRange { range: DateRange },

    /// Country present in the data but not in the boundary set
    MissingJoinKey { country: String },
}

/// Consumer of session signals.
pub trait SignalHandler {
    /// Handle a single signal with read access to the views it refers to.
    fn handle_signal(&mut self, signal: &DashboardSignal, views: &DashboardViews);

    /// Handle multiple signals (default implementation calls handle_signal for each)
    fn handle_signals(&mut self, signals: &[DashboardSignal], views: &DashboardViews) {
        for signal in signals {
            self.handle_signal(signal, views);
        }
    }
}
