pub mod context;
pub mod dataset;
pub mod filter;
pub mod geo;
pub mod query;
pub mod reference;
pub mod selection;
pub mod session;
pub mod signals;
pub mod views;

// Re-exports for convenience
pub use context::{ConfigError, DashboardConfig, DashboardConfigExt, MapColorMode, TrendMetric};
pub use dataset::{
    AqiClassifier, AqiReading, Dataset, DatasetError, LoadOptions, LoadReport, Record,
    RecordPredicate, RowIssue,
};
pub use filter::{FilterChange, FilterListener, FilterState, FilterStore, RecordFilter};
pub use geo::{BoundaryError, BoundaryFeature, BoundaryIndex};
pub use query::{
    AggFn, AggValue, AggregationSpec, DerivedRow, DerivedView, GroupField, GroupKey, ValueField,
    aggregate, linear_fit, rolling_mean, time_series,
};
pub use reference::{category_fill, country_key, region_center};
pub use selection::{SelectionSet, SelectionState};
pub use session::DashboardSession;
pub use signals::{DashboardSignal, SignalHandler};
pub use views::{DashboardViews, ViewKind};
