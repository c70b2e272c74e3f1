use hashbrown::HashMap;

use crate::dataset::{Dataset, Record};
use crate::filter::FilterState;
use crate::query::{AggFn, AggregationSpec, GroupField, GroupKey, ValueField, aggregate};
use airwatch_types::{ChartEncoding, Mark, SummaryRow, SummaryView};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Min, max and mean per country in the country filter, or per country in
/// the pollutant and date scope when no country is selected.
pub fn summary_view(dataset: &Dataset, filters: &FilterState) -> SummaryView {
    let scope = filters.country_scope();
    let records: Vec<&Record> = dataset.filter(&scope).collect();

    let by_country = |agg| {
        aggregate(
            records.iter().copied(),
            &AggregationSpec::new(GroupField::Country, ValueField::Value, agg),
        )
    };
    let means = by_country(AggFn::Mean);
    let mins = by_country(AggFn::Min);
    let maxes = by_country(AggFn::Max);
    let mins = mins.by_key();
    let maxes = maxes.by_key();

    // first record supplies pollutant and unit; count includes rows without a valid value
    let mut per_country: HashMap<GroupKey, (&Record, usize)> = HashMap::new();
    for record in records.iter().copied() {
        per_country
            .entry(GroupField::Country.key(record))
            .or_insert((record, 0))
            .1 += 1;
    }

    let rows = means
        .rows()
        .iter()
        .filter_map(|mean| {
            let min = mins.get(&mean.key)?.value.as_number()?;
            let max = maxes.get(&mean.key)?.value.as_number()?;
            let (first, rows) = per_country.get(&mean.key)?;
            Some(SummaryRow {
                country: mean.key.label(),
                pollutant: first.pollutant_name().to_string(),
                unit: first.unit_name().to_string(),
                min: round2(min),
                max: round2(max),
                mean: round2(mean.value.as_number()?),
                count: *rows,
            })
        })
        .collect();

    SummaryView {
        rows,
        encoding: ChartEncoding::new(Mark::Table, format!("{} summary", filters.pollutant)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use airwatch_types::DateRange;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new("India", "Asia", "PM2.5", date(2020, 1, 1), 80.123, "µg/m³"),
            Record::new("India", "Asia", "PM2.5", date(2020, 2, 1), 100.0, "µg/m³"),
            Record::new("India", "Asia", "PM2.5", date(2020, 3, 1), 90.0, "µg/m³"),
            Record::new("Japan", "Asia", "PM2.5", date(2020, 1, 1), 20.0, "µg/m³"),
            Record::new("France", "Europe", "NO2", date(2020, 1, 1), 33.0, "µg/m³"),
        ])
    }

    fn filters() -> FilterState {
        FilterState::new("PM2.5", DateRange::new(date(2020, 1, 1), date(2020, 12, 31)))
    }

    #[test]
    fn rows_for_selected_countries() {
        let view = summary_view(&dataset(), &filters().with_countries(["India"]));
        assert_eq!(
            view.rows,
            vec![SummaryRow {
                country: "India".into(),
                pollutant: "PM2.5".into(),
                unit: "µg/m³".into(),
                min: 80.12,
                max: 100.0,
                mean: 90.04,
                count: 3,
            }]
        );
    }

    #[test]
    fn empty_country_filter_summarises_everything_in_scope() {
        let view = summary_view(&dataset(), &filters());
        let countries: Vec<_> = view.rows.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["India", "Japan"]);
    }

    #[test]
    fn count_includes_rows_without_a_valid_value() {
        let mut records = dataset().records().to_vec();
        records.push(Record::new("Japan", "Asia", "PM2.5", date(2020, 2, 1), f64::NAN, "µg/m³"));
        let view = summary_view(&Dataset::from_records(records), &filters().with_countries(["Japan"]));
        assert_eq!(view.rows[0].count, 2);
        assert_eq!(view.rows[0].mean, 20.0);
    }

    #[test]
    fn selected_country_without_data_has_no_row() {
        let view = summary_view(&dataset(), &filters().with_countries(["France"]));
        assert!(view.rows.is_empty());
        assert_eq!(view.encoding.mark, Mark::Table);
    }
}
