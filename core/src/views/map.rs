use crate::dataset::{Dataset, Record};
use crate::filter::FilterState;
use crate::geo::BoundaryIndex;
use crate::query::{AggFn, AggValue, AggregationSpec, GroupField, ValueField, aggregate};
use crate::reference::{category_fill, region_center};
use crate::selection::SelectionSet;
use airwatch_types::{ChartEncoding, ColorValue, MapColorMode, MapRow, MapView, MapViewport, Mark};

const SINGLE_REGION_SCALE: f64 = 1.5;

/// Choropleth of the region-scoped records, one row per country.
///
/// Countries missing from `boundaries` are kept but left uncoloured and
/// listed in `unmatched`.
pub fn map_view(
    dataset: &Dataset,
    filters: &FilterState,
    boundaries: &BoundaryIndex,
    mode: MapColorMode,
) -> MapView {
    let scope = filters.region_scope();
    let records: Vec<&Record> = dataset.filter(&scope).collect();

    let spec = match mode {
        MapColorMode::MeanValue => AggregationSpec::new(GroupField::Country, ValueField::Value, AggFn::Mean),
        MapColorMode::ModalCategory => {
            AggregationSpec::new(GroupField::Country, ValueField::AqiCategory, AggFn::Mode)
        }
    };
    let derived = aggregate(records.iter().copied(), &spec);

    let mut unmatched = Vec::new();
    let rows = derived
        .rows()
        .iter()
        .map(|row| {
            let country = row.key.label();
            let georeferenced = boundaries.contains(&country);
            let (color_value, fill) = if georeferenced {
                match row.value {
                    AggValue::Number(mean) => (Some(ColorValue::Mean(mean)), None),
                    AggValue::Category(category) => (
                        Some(ColorValue::Category(category)),
                        Some(category_fill(category).to_string()),
                    ),
                }
            } else {
                tracing::warn!(%country, "No boundary feature for country, drawing uncoloured");
                unmatched.push(country.clone());
                (None, None)
            };
            MapRow {
                highlighted: filters.selected_countries.contains(&country),
                country,
                color_value,
                fill,
                georeferenced,
                observations: row.observations,
            }
        })
        .collect();

    let color_field = match mode {
        MapColorMode::MeanValue => "mean",
        MapColorMode::ModalCategory => "aqi_category",
    };

    MapView {
        rows,
        viewport: viewport(filters),
        unmatched,
        encoding: ChartEncoding::new(Mark::Choropleth, format!("{} by country", filters.pollutant))
            .color(color_field),
    }
}

/// Centre on the region when exactly one is selected.
fn viewport(filters: &FilterState) -> MapViewport {
    let mut regions = filters.regions.iter();
    match (regions.next(), regions.next()) {
        (Some(region), None) => match region_center(region) {
            Some(center) => MapViewport {
                center,
                projection_scale: SINGLE_REGION_SCALE,
            },
            None => MapViewport {
                projection_scale: SINGLE_REGION_SCALE,
                ..Default::default()
            },
        },
        _ => MapViewport::default(),
    }
}

/// Re-flag border highlights from the click selection without re-aggregating.
pub fn apply_highlights(view: &mut MapView, selection: &SelectionSet) {
    for row in &mut view.rows {
        row.highlighted = selection.contains(&row.country);
    }
}
