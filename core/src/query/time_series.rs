//! Per-group time series, the centred rolling mean and a linear trend fit.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use hashbrown::HashMap;

use super::{GroupField, GroupKey, ValueField};
use crate::dataset::Record;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: NaiveDate,
    pub time_hour: Option<NaiveDateTime>,
    pub value: f64,
}

impl SeriesPoint {
    /// Seconds since the epoch, at midnight when there is no hour.
    pub fn timestamp(&self) -> f64 {
        let at = self.time_hour.unwrap_or_else(|| self.time.and_time(NaiveTime::MIN));
        at.and_utc().timestamp() as f64
    }
}

/// Time-ordered numeric points for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: GroupKey,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Least-squares line over timestamp, evaluated at every point.
    pub fn regression(&self) -> Vec<f64> {
        let xy: Vec<(f64, f64)> = self.points.iter().map(|p| (p.timestamp(), p.value)).collect();
        linear_fit(&xy)
    }
}

/// Split `records` into one series per group, in first-appearance order.
///
/// Points are ordered by date then hour; records at the same instant keep
/// their input order. Non-numeric and missing values are skipped, and a
/// group left with no points is dropped.
pub fn time_series<'a, I>(records: I, group_by: GroupField, value_field: ValueField) -> Vec<Series>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut series: Vec<Series> = Vec::new();

    for record in records {
        let Some(value) = value_field.extract(record).and_then(|v| v.as_number()) else {
            continue;
        };
        let key = group_by.key(record);
        let slot = *index.entry(key).or_insert_with(|| {
            series.push(Series {
                key,
                points: Vec::new(),
            });
            series.len() - 1
        });
        series[slot].points.push(SeriesPoint {
            time: record.time,
            time_hour: record.time_hour,
            value,
        });
    }

    for s in &mut series {
        s.points.sort_by_key(|p| (p.time, p.time_hour));
    }
    series
}

/// Centred moving average over `[i - half_width, i + half_width]`, clipped
/// at both ends of the series. Each window is summed on its own so one extreme
/// value only affects the windows that contain it.
pub fn rolling_mean(values: &[f64], half_width: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_width);
            let hi = (i + half_width + 1).min(n);
            values[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
        })
        .collect()
}

/// Ordinary least-squares line through `(x, y)`, evaluated at each `x`.
/// With fewer than two distinct `x` the line is flat at the mean of `y`.
pub fn linear_fit(points: &[(f64, f64)]) -> Vec<f64> {
    if points.is_empty() {
        return Vec::new();
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

    // centred sums keep epoch-sized x values from swamping the slope
    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

    points
        .iter()
        .map(|&(x, _)| mean_y + slope * (x - mean_x))
        .collect()
}
