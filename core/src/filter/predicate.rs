use hashbrown::HashSet;

use crate::context::{IStr, lookup};
use crate::dataset::{Record, RecordPredicate};
use airwatch_types::DateRange;

/// Conjunction of the dashboard's record predicates.
///
/// An unset predicate passes every record. Region and country selections
/// that are empty stay unset, so "nothing selected" means "no restriction".
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pollutant: Option<HashSet<IStr>>,
    regions: Option<HashSet<IStr>>,
    countries: Option<HashSet<IStr>>,
    date_range: Option<DateRange>,
}

/// Names never seen by the interner cannot match any record and are left out.
fn membership<I, S>(names: I) -> Option<HashSet<IStr>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut any = false;
    let keys = names
        .into_iter()
        .inspect(|_| any = true)
        .filter_map(|name| lookup(name.as_ref()))
        .collect();
    any.then_some(keys)
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pollutant(mut self, pollutant: &str) -> Self {
        self.pollutant = membership([pollutant]);
        self
    }

    pub fn regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.regions = membership(regions);
        self
    }

    pub fn countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.countries = membership(countries);
        self
    }

    pub fn dates(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }
}

impl RecordPredicate for RecordFilter {
    fn matches(&self, record: &Record) -> bool {
        self.pollutant
            .as_ref()
            .is_none_or(|p| p.contains(&record.pollutant))
            && self
                .date_range
                .is_none_or(|range| range.contains(record.time))
            && self
                .regions
                .as_ref()
                .is_none_or(|r| r.contains(&record.continent))
            && self
                .countries
                .as_ref()
                .is_none_or(|c| c.contains(&record.country))
    }
}
