//! Map-click selection: each country is either selected or not, and a click
//! flips it. Nothing else moves a country between the two states.

use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionState {
    Unselected,
    Selected,
}

impl SelectionState {
    pub fn toggled(self) -> Self {
        match self {
            SelectionState::Unselected => SelectionState::Selected,
            SelectionState::Selected => SelectionState::Unselected,
        }
    }
}

/// Countries selected by clicking the map, kept in name order.
///
/// Membership is independent of the current filters: a selected country
/// stays selected even when it drops out of the filtered data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    countries: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, country: &str) -> SelectionState {
        if self.countries.contains(country) {
            SelectionState::Selected
        } else {
            SelectionState::Unselected
        }
    }

    pub fn contains(&self, country: &str) -> bool {
        self.countries.contains(country)
    }

    /// Flip `country` and return its new state.
    pub fn toggle(&mut self, country: &str) -> SelectionState {
        let next = self.state_of(country).toggled();
        match next {
            SelectionState::Selected => self.countries.insert(country.to_string()),
            SelectionState::Unselected => self.countries.remove(country),
        };
        next
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(String::as_str)
    }
}
