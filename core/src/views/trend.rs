use crate::dataset::Dataset;
use crate::filter::FilterState;
use crate::query::{GroupField, ValueField, rolling_mean, time_series};
use airwatch_types::{ChartEncoding, Mark, TrendMetric, TrendPoint, TrendSeries, TrendView};

/// Per-country series under the country scope, each with its centred
/// rolling mean and linear trend line. The region filter does not apply here.
pub fn trend_view(dataset: &Dataset, filters: &FilterState, metric: TrendMetric, half_width: usize) -> TrendView {
    let scope = filters.country_scope();
    let value_field = match metric {
        TrendMetric::Value => ValueField::Value,
        TrendMetric::Aqi => ValueField::Aqi,
    };

    let series = time_series(dataset.filter(&scope), GroupField::Country, value_field)
        .into_iter()
        .map(|s| {
            let smoothed = rolling_mean(&s.values(), half_width);
            let fitted = s.regression();
            let points: Vec<TrendPoint> = s
                .points
                .iter()
                .map(|p| TrendPoint {
                    date: p.time,
                    value: p.value,
                })
                .collect();
            let along = |values: Vec<f64>| -> Vec<TrendPoint> {
                points
                    .iter()
                    .zip(values)
                    .map(|(p, value)| TrendPoint { date: p.date, value })
                    .collect()
            };
            let rolling = along(smoothed);
            let regression = along(fitted);
            TrendSeries {
                country: s.key.label(),
                points,
                rolling,
                regression,
            }
        })
        .collect();

    let y = match metric {
        TrendMetric::Value => "value",
        TrendMetric::Aqi => "aqi",
    };

    TrendView {
        series,
        half_width,
        metric,
        encoding: ChartEncoding::new(Mark::Line, format!("{} over time", filters.pollutant))
            .x("date")
            .y(y)
            .color("country"),
    }
}
