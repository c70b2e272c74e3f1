use crate::dataset::{Dataset, Record};
use crate::filter::FilterState;
use crate::query::{AggFn, AggregationSpec, GroupField, ValueField, aggregate};
use crate::reference::category_fill;
use airwatch_types::{ChartEncoding, Mark, SortOrder, TopCountryRow, TopNView};

/// Countries ranked by mean value under the region scope, highest first.
/// The first row is the leader offered to the country filter.
pub fn top_n_view(dataset: &Dataset, filters: &FilterState, limit: usize) -> TopNView {
    let scope = filters.region_scope();
    let records: Vec<&Record> = dataset.filter(&scope).collect();

    let ranked = aggregate(
        records.iter().copied(),
        &AggregationSpec::new(GroupField::Country, ValueField::Value, AggFn::Mean)
            .sorted(SortOrder::Descending)
            .limit(limit),
    );
    let modes = aggregate(
        records.iter().copied(),
        &AggregationSpec::new(GroupField::Country, ValueField::AqiCategory, AggFn::Mode),
    );
    let modes = modes.by_key();

    let rows: Vec<TopCountryRow> = ranked
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let mean_value = row.value.as_number()?;
            let modal_category = modes.get(&row.key).and_then(|m| m.value.as_category());
            Some(TopCountryRow {
                rank: i + 1,
                country: row.key.label(),
                mean_value,
                modal_category,
                fill: modal_category.map(|c| category_fill(c).to_string()),
            })
        })
        .collect();

    TopNView {
        leader: rows.first().map(|r| r.country.clone()),
        rows,
        encoding: ChartEncoding::new(
            Mark::Bar,
            format!("Top {limit} countries by mean {}", filters.pollutant),
        )
        .x("mean_value")
        .y("country")
        .color("modal_category")
        .sort(SortOrder::Descending),
    }
}
