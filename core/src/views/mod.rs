//! View binders: pure functions from the dataset and a filter snapshot to
//! the view models the dashboard renders.

mod map;
mod options;
mod summary;
mod top_n;
mod trend;

pub use map::{apply_highlights, map_view};
pub use options::{country_options, filter_options, region_options};
pub use summary::summary_view;
pub use top_n::top_n_view;
pub use trend::trend_view;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::filter::{FilterChange, FilterState};
use crate::geo::BoundaryIndex;
use airwatch_types::{DashboardConfig, FilterOptions, MapView, SummaryView, TopNView, TrendView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Map,
    TopN,
    Trend,
    Summary,
    Options,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::Map,
        ViewKind::TopN,
        ViewKind::Trend,
        ViewKind::Summary,
        ViewKind::Options,
    ];

    /// Views that must be rebuilt after `change`.
    ///
    /// A selection toggle rebuilds nothing; it only re-flags map highlights.
    pub fn affected_by(change: &FilterChange) -> &'static [ViewKind] {
        match change {
            FilterChange::Pollutant | FilterChange::DateRange => &ViewKind::ALL,
            FilterChange::Regions => &[ViewKind::Map, ViewKind::TopN, ViewKind::Options],
            FilterChange::Countries => &[ViewKind::Trend, ViewKind::Summary],
            FilterChange::Selection { .. } => &[],
        }
    }
}

/// Everything the dashboard currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardViews {
    pub map: MapView,
    pub top_n: TopNView,
    pub trend: TrendView,
    pub summary: SummaryView,
    pub options: FilterOptions,
}

impl DashboardViews {
    /// Rebuild one view from scratch.
    pub fn rebuild(
        &mut self,
        kind: ViewKind,
        dataset: &Dataset,
        filters: &FilterState,
        boundaries: &BoundaryIndex,
        config: &DashboardConfig,
    ) {
        match kind {
            ViewKind::Map => self.map = map_view(dataset, filters, boundaries, config.map_color_mode),
            ViewKind::TopN => self.top_n = top_n_view(dataset, filters, config.top_n_limit),
            ViewKind::Trend => {
                self.trend = trend_view(dataset, filters, config.trend_metric, config.rolling_half_width)
            }
            ViewKind::Summary => self.summary = summary_view(dataset, filters),
            ViewKind::Options => self.options = filter_options(dataset, filters),
        }
    }

    pub fn is_empty(&self, kind: ViewKind) -> bool {
        match kind {
            ViewKind::Map => self.map.rows.is_empty(),
            ViewKind::TopN => self.top_n.rows.is_empty(),
            ViewKind::Trend => self.trend.series.is_empty(),
            ViewKind::Summary => self.summary.rows.is_empty(),
            ViewKind::Options => self.options.regions.is_empty() && self.options.countries.is_empty(),
        }
    }
}
