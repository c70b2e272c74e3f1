//! In-memory air quality dataset.
//!
//! Records are loaded once and never mutated afterwards; every view reads
//! them through [`Dataset::filter`].

mod error;
mod parser;
mod reader;

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::context::{IStr, intern, resolve};
use airwatch_types::{AqiCategory, DateRange};

pub use error::DatasetError;
pub use parser::{CsvParser, RowIssue};
pub use reader::{parse_bytes, read_dataset};

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// One observation of one pollutant in one country.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub country: IStr,
    pub continent: IStr,
    pub pollutant: IStr,
    pub unit: IStr,
    /// Observation date (timestamps are truncated to the day on load)
    pub time: NaiveDate,
    pub time_hour: Option<NaiveDateTime>,
    pub value: f64,
    pub aqi: Option<f64>,
    pub aqi_category: Option<AqiCategory>,
}

impl Record {
    pub fn new(
        country: &str,
        continent: &str,
        pollutant: &str,
        time: NaiveDate,
        value: f64,
        unit: &str,
    ) -> Self {
        Self {
            country: intern(country),
            continent: intern(continent),
            pollutant: intern(pollutant),
            unit: intern(unit),
            time,
            time_hour: None,
            value,
            aqi: None,
            aqi_category: None,
        }
    }

    pub fn with_aqi(mut self, aqi: f64, category: AqiCategory) -> Self {
        self.aqi = Some(aqi);
        self.aqi_category = Some(category);
        self
    }

    pub fn with_time_hour(mut self, time_hour: NaiveDateTime) -> Self {
        self.time_hour = Some(time_hour);
        self
    }

    pub fn country_name(&self) -> &'static str {
        resolve(self.country)
    }

    pub fn continent_name(&self) -> &'static str {
        resolve(self.continent)
    }

    pub fn pollutant_name(&self) -> &'static str {
        resolve(self.pollutant)
    }

    pub fn unit_name(&self) -> &'static str {
        resolve(self.unit)
    }
}

/// Read-only predicate over records.
pub trait RecordPredicate {
    fn matches(&self, record: &Record) -> bool;
}

impl<F> RecordPredicate for F
where
    F: Fn(&Record) -> bool,
{
    fn matches(&self, record: &Record) -> bool {
        self(record)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AQI Classification
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AqiReading {
    pub aqi: f64,
    pub category: AqiCategory,
}

/// Maps a pollutant concentration to an AQI reading. The breakpoint tables
/// are supplied by the caller.
pub trait AqiClassifier: Sync {
    fn classify(&self, pollutant: &str, value: f64) -> Option<AqiReading>;
}

impl<F> AqiClassifier for F
where
    F: Fn(&str, f64) -> Option<AqiReading> + Sync,
{
    fn classify(&self, pollutant: &str, value: f64) -> Option<AqiReading> {
        self(pollutant, value)
    }
}

#[derive(Default, Clone, Copy)]
pub struct LoadOptions<'a> {
    /// Fills `aqi`/`aqi_category` on records that lack them
    pub classifier: Option<&'a dyn AqiClassifier>,
}

/// Outcome of a load: how many rows were read, kept and dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rows: usize,
    pub loaded: usize,
    pub classified: usize,
    /// Rows dropped for a missing or unparseable field
    pub dropped: Vec<RowIssue>,
}

impl LoadReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Returns how many records were classified.
fn classify_records(records: &mut [Record], classifier: &dyn AqiClassifier) -> usize {
    let mut classified = 0;
    for record in records.iter_mut().filter(|r| r.aqi.is_none() || r.aqi_category.is_none()) {
        if let Some(reading) = classifier.classify(record.pollutant_name(), record.value) {
            record.aqi.get_or_insert(reading.aqi);
            record.aqi_category.get_or_insert(reading.category);
            classified += 1;
        }
    }
    classified
}

// ─────────────────────────────────────────────────────────────────────────────
// Dataset
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    report: LoadReport,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        let report = LoadReport {
            rows: records.len(),
            loaded: records.len(),
            ..Default::default()
        };
        Self { records, report }
    }

    pub fn from_records_with(mut records: Vec<Record>, options: &LoadOptions<'_>) -> Self {
        let classified = options
            .classifier
            .map(|c| classify_records(&mut records, c))
            .unwrap_or(0);
        let mut dataset = Self::from_records(records);
        dataset.report.classified = classified;
        dataset
    }

    /// Load a CSV file. Malformed rows are dropped and reported, not fatal.
    pub fn load(path: &Path, options: &LoadOptions<'_>) -> Result<Self, DatasetError> {
        let (mut records, mut report) = read_dataset(path)?;
        if let Some(classifier) = options.classifier {
            report.classified = classify_records(&mut records, classifier);
        }
        tracing::info!(
            path = %path.display(),
            loaded = report.loaded,
            dropped = report.dropped_count(),
            classified = report.classified,
            "Dataset loaded"
        );
        Ok(Self { records, report })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Lazily yields the records matching `predicate`, in load order.
    pub fn filter<'a, P>(&'a self, predicate: &'a P) -> impl Iterator<Item = &'a Record> + 'a
    where
        P: RecordPredicate + ?Sized,
    {
        self.records.iter().filter(move |r| predicate.matches(r))
    }

    pub fn pollutants(&self) -> Vec<&'static str> {
        distinct(self.records.iter().map(|r| r.pollutant))
    }

    pub fn continents(&self) -> Vec<&'static str> {
        distinct(self.records.iter().map(|r| r.continent))
    }

    pub fn countries(&self) -> Vec<&'static str> {
        distinct(self.records.iter().map(|r| r.country))
    }

    /// Earliest and latest observation dates.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let start = self.records.iter().map(|r| r.time).min()?;
        let end = self.records.iter().map(|r| r.time).max()?;
        Some(DateRange::new(start, end))
    }
}

/// Distinct names in first-appearance order.
pub(crate) fn distinct(keys: impl Iterator<Item = IStr>) -> Vec<&'static str> {
    let mut seen = hashbrown::HashSet::new();
    keys.filter(|k| seen.insert(*k)).map(resolve).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            Record::new("India", "Asia", "PM2.5", date(2020, 1, 15), 80.0, "µg/m³"),
            Record::new("Japan", "Asia", "PM2.5", date(2020, 1, 15), 20.0, "µg/m³"),
            Record::new("France", "Europe", "NO2", date(2020, 3, 2), 31.0, "µg/m³"),
            Record::new("India", "Asia", "NO2", date(2019, 12, 30), 44.0, "µg/m³"),
        ])
    }

    #[test]
    fn distinct_columns_keep_first_appearance_order() {
        let dataset = sample();
        assert_eq!(dataset.countries(), vec!["India", "Japan", "France"]);
        assert_eq!(dataset.continents(), vec!["Asia", "Europe"]);
        assert_eq!(dataset.pollutants(), vec!["PM2.5", "NO2"]);
    }

    #[test]
    fn date_bounds_span_all_records() {
        let bounds = sample().date_bounds().unwrap();
        assert_eq!(bounds.start, date(2019, 12, 30));
        assert_eq!(bounds.end, date(2020, 3, 2));
        assert!(Dataset::default().date_bounds().is_none());
    }

    #[test]
    fn filter_accepts_closures() {
        let dataset = sample();
        let no2 = |r: &Record| r.pollutant_name() == "NO2";
        let countries: Vec<_> = dataset.filter(&no2).map(|r| r.country_name()).collect();
        assert_eq!(countries, vec!["France", "India"]);
    }

    #[test]
    fn classifier_fills_missing_aqi_only() {
        let classifier = |_: &str, value: f64| {
            Some(AqiReading {
                aqi: value * 2.0,
                category: AqiCategory::Moderate,
            })
        };
        let records = vec![
            Record::new("India", "Asia", "PM2.5", date(2020, 1, 15), 80.0, "µg/m³")
                .with_aqi(164.0, AqiCategory::Unhealthy),
            Record::new("Japan", "Asia", "PM2.5", date(2020, 1, 15), 20.0, "µg/m³"),
        ];
        let dataset = Dataset::from_records_with(
            records,
            &LoadOptions {
                classifier: Some(&classifier),
            },
        );
        assert_eq!(dataset.report().classified, 1);
        assert_eq!(dataset.records()[0].aqi, Some(164.0));
        assert_eq!(dataset.records()[0].aqi_category, Some(AqiCategory::Unhealthy));
        assert_eq!(dataset.records()[1].aqi, Some(40.0));
        assert_eq!(dataset.records()[1].aqi_category, Some(AqiCategory::Moderate));
    }
}
