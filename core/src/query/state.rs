use std::cmp::Ordering;

use hashbrown::HashMap;

use super::{AggFn, AggValue, FieldValue};
use airwatch_types::AqiCategory;

/// Hashable form of a field value for mode counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum ModeKey {
    Number(u64),
    Category(AqiCategory),
}

impl ModeKey {
    fn from_value(value: FieldValue) -> Self {
        match value {
            // -0.0 and 0.0 count as the same value
            FieldValue::Number(n) => ModeKey::Number(if n == 0.0 { 0.0f64.to_bits() } else { n.to_bits() }),
            FieldValue::Category(c) => ModeKey::Category(c),
        }
    }

    fn into_value(self) -> AggValue {
        match self {
            ModeKey::Number(bits) => AggValue::Number(f64::from_bits(bits)),
            ModeKey::Category(c) => AggValue::Category(c),
        }
    }

    /// Tie-break order: categories by label, numbers ascending.
    fn tie_order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ModeKey::Number(a), ModeKey::Number(b)) => f64::from_bits(*a).total_cmp(&f64::from_bits(*b)),
            (ModeKey::Category(a), ModeKey::Category(b)) => a.label().cmp(b.label()),
            (ModeKey::Number(_), ModeKey::Category(_)) => Ordering::Less,
            (ModeKey::Category(_), ModeKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Running state for one group's aggregation.
#[derive(Debug, Clone)]
pub(super) enum AggregationState {
    Mean { sum: f64, count: usize },
    Min(Option<f64>),
    Max(Option<f64>),
    Mode(HashMap<ModeKey, usize>),
    Count(usize),
}

impl AggregationState {
    pub(super) fn new(agg: AggFn) -> Self {
        match agg {
            AggFn::Mean => AggregationState::Mean { sum: 0.0, count: 0 },
            AggFn::Min => AggregationState::Min(None),
            AggFn::Max => AggregationState::Max(None),
            AggFn::Mode => AggregationState::Mode(HashMap::new()),
            AggFn::Count => AggregationState::Count(0),
        }
    }

    /// Feed one valid value. Numeric reductions skip categorical values.
    pub(super) fn update(&mut self, value: FieldValue) {
        match self {
            AggregationState::Mean { sum, count } => {
                if let Some(n) = value.as_number() {
                    *sum += n;
                    *count += 1;
                }
            }
            AggregationState::Min(min) => {
                if let Some(n) = value.as_number() {
                    *min = Some(min.map_or(n, |m| m.min(n)));
                }
            }
            AggregationState::Max(max) => {
                if let Some(n) = value.as_number() {
                    *max = Some(max.map_or(n, |m| m.max(n)));
                }
            }
            AggregationState::Mode(counts) => {
                *counts.entry(ModeKey::from_value(value)).or_insert(0) += 1;
            }
            AggregationState::Count(count) => *count += 1,
        }
    }

    /// None when the group saw no usable values.
    pub(super) fn finish(self) -> Option<AggValue> {
        match self {
            AggregationState::Mean { sum, count } => (count > 0).then(|| AggValue::Number(sum / count as f64)),
            AggregationState::Min(min) => min.map(AggValue::Number),
            AggregationState::Max(max) => max.map(AggValue::Number),
            AggregationState::Mode(counts) => counts
                .into_iter()
                .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.tie_order(ka)))
                .map(|(key, _)| key.into_value()),
            AggregationState::Count(count) => (count > 0).then_some(AggValue::Number(count as f64)),
        }
    }
}
