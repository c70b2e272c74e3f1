//! Aggregation engine for dashboard views.
//!
//! Provides:
//! - Grouped reductions (mean, min, max, mode, count) over one record field
//! - Stable sorting and truncation of the grouped rows
//! - Per-group time series with a centred rolling mean

mod state;
mod time_series;

use std::cmp::Ordering;

use chrono::NaiveDate;
use hashbrown::HashMap;

use crate::context::{IStr, resolve};
use crate::dataset::Record;
use airwatch_types::{AqiCategory, SortOrder};
use state::AggregationState;

pub use time_series::{Series, SeriesPoint, linear_fit, rolling_mean, time_series};

// ─────────────────────────────────────────────────────────────────────────────
// Fields
// ─────────────────────────────────────────────────────────────────────────────

/// Record field used as the grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Country,
    Continent,
    Pollutant,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Name(IStr),
    Date(NaiveDate),
}

impl GroupField {
    pub fn key(&self, record: &Record) -> GroupKey {
        match self {
            GroupField::Country => GroupKey::Name(record.country),
            GroupField::Continent => GroupKey::Name(record.continent),
            GroupField::Pollutant => GroupKey::Name(record.pollutant),
            GroupField::Date => GroupKey::Date(record.time),
        }
    }
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            GroupKey::Name(name) => resolve(*name).to_string(),
            GroupKey::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn name(&self) -> Option<IStr> {
        match self {
            GroupKey::Name(name) => Some(*name),
            GroupKey::Date(_) => None,
        }
    }
}

/// Record field being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueField {
    Value,
    Aqi,
    AqiCategory,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Category(AqiCategory),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Category(_) => None,
        }
    }
}

impl ValueField {
    /// None for missing or non-finite values.
    pub fn extract(&self, record: &Record) -> Option<FieldValue> {
        let number = match self {
            ValueField::Value => Some(record.value),
            ValueField::Aqi => record.aqi,
            ValueField::AqiCategory => return record.aqi_category.map(FieldValue::Category),
        };
        number.filter(|n| n.is_finite()).map(FieldValue::Number)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregation Spec
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFn {
    Mean,
    Min,
    Max,
    Mode,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationSpec {
    pub group_by: GroupField,
    pub value_field: ValueField,
    pub agg: AggFn,
    pub sort: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl AggregationSpec {
    pub fn new(group_by: GroupField, value_field: ValueField, agg: AggFn) -> Self {
        Self {
            group_by,
            value_field,
            agg,
            sort: None,
            limit: None,
        }
    }

    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Derived View
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggValue {
    Number(f64),
    Category(AqiCategory),
}

impl AggValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AggValue::Number(n) => Some(*n),
            AggValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<AqiCategory> {
        match self {
            AggValue::Number(_) => None,
            AggValue::Category(c) => Some(*c),
        }
    }

    /// Numbers by value, categories by severity.
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AggValue::Number(a), AggValue::Number(b)) => a.total_cmp(b),
            (AggValue::Category(a), AggValue::Category(b)) => a.cmp(b),
            (AggValue::Number(_), AggValue::Category(_)) => Ordering::Less,
            (AggValue::Category(_), AggValue::Number(_)) => Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub key: GroupKey,
    pub value: AggValue,
    /// Valid values that fed the aggregation
    pub observations: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedView {
    rows: Vec<DerivedRow>,
}

impl DerivedView {
    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: GroupKey) -> Option<&DerivedRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Index by key for repeated lookups.
    pub fn by_key(&self) -> HashMap<GroupKey, &DerivedRow> {
        self.rows.iter().map(|r| (r.key, r)).collect()
    }
}

/// Group `records`, reduce each group, then sort and truncate per `spec`.
///
/// Groups start in first-appearance order and the sort is stable, so rows
/// with equal values keep that order. Groups without a single valid value are
/// dropped.
pub fn aggregate<'a, I>(records: I, spec: &AggregationSpec) -> DerivedView
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, AggregationState, usize)> = Vec::new();

    for record in records {
        let key = spec.group_by.key(record);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, AggregationState::new(spec.agg), 0));
            groups.len() - 1
        });
        if let Some(value) = spec.value_field.extract(record) {
            let (_, state, observations) = &mut groups[slot];
            state.update(value);
            *observations += 1;
        }
    }

    let mut rows: Vec<DerivedRow> = groups
        .into_iter()
        .filter_map(|(key, state, observations)| {
            state.finish().map(|value| DerivedRow {
                key,
                value,
                observations,
            })
        })
        .collect();

    match spec.sort {
        Some(SortOrder::Ascending) => rows.sort_by(|a, b| a.value.compare(&b.value)),
        Some(SortOrder::Descending) => rows.sort_by(|a, b| b.value.compare(&a.value)),
        None => {}
    }
    if let Some(limit) = spec.limit {
        rows.truncate(limit);
    }

    DerivedView { rows }
}
