use std::collections::BTreeSet;

use serde::Serialize;

use super::RecordFilter;
use crate::selection::SelectionSet;
use airwatch_types::DateRange;

/// One immutable snapshot of the user's filter selections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    pub pollutant: String,
    pub regions: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    pub date_range: DateRange,
    pub selected_countries: SelectionSet,
}

impl FilterState {
    pub fn new(pollutant: impl Into<String>, date_range: DateRange) -> Self {
        Self {
            pollutant: pollutant.into(),
            regions: BTreeSet::new(),
            countries: BTreeSet::new(),
            date_range,
            selected_countries: SelectionSet::new(),
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    /// Pollutant and dates only.
    pub fn base_scope(&self) -> RecordFilter {
        RecordFilter::new()
            .pollutant(&self.pollutant)
            .dates(self.date_range)
    }

    /// Pollutant, dates and regions: what the map and ranking read.
    pub fn region_scope(&self) -> RecordFilter {
        self.base_scope().regions(&self.regions)
    }

    /// Pollutant, dates and countries: what the trend and summary read.
    /// Regions are not applied.
    pub fn country_scope(&self) -> RecordFilter {
        self.base_scope().countries(&self.countries)
    }
}
