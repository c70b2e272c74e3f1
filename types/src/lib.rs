//! Shared view and configuration types for Airwatch
//!
//! This crate contains serializable types that are shared between the native
//! query engine (airwatch-core) and whatever frontend renders the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// AQI Categories
// ─────────────────────────────────────────────────────────────────────────────

/// Air quality index category, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Display label, as written in the source dataset
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Parse a dataset label (case-insensitive, surrounding whitespace ignored).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Date Range
// ─────────────────────────────────────────────────────────────────────────────

/// Inclusive date range filter.
///
/// A range whose start is after its end is kept as-is; it simply contains no
/// dates, so every view built from it comes out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// First day of the start month through the last day of the end month.
    /// The end month is included in full rather than cut off at its first
    /// day, so a one-month selection covers the whole month.
    /// Returns None for out-of-range months.
    pub fn from_months(start_year: i32, start_month: u32, end_year: i32, end_month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)?;
        let (next_year, next_month) = if end_month == 12 {
            (end_year + 1, 1)
        } else {
            (end_year, end_month + 1)
        };
        // validate end_month before rolling over
        NaiveDate::from_ymd_opt(end_year, end_month, 1)?;
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
        Some(Self { start, end })
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chart Encodings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Mark type the renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mark {
    #[default]
    Table,
    Choropleth,
    Bar,
    Line,
}

/// Encoding intent handed to the rendering layer alongside view rows.
/// Field names refer to the serialized row fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartEncoding {
    pub mark: Mark,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

impl ChartEncoding {
    pub fn new(mark: Mark, title: impl Into<String>) -> Self {
        Self {
            mark,
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn x(mut self, field: &str) -> Self {
        self.x = Some(field.to_string());
        self
    }

    pub fn y(mut self, field: &str) -> Self {
        self.y = Some(field.to_string());
        self
    }

    pub fn color(mut self, field: &str) -> Self {
        self.color = Some(field.to_string());
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View Models
// ─────────────────────────────────────────────────────────────────────────────

/// What a choropleth region is coloured by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ColorValue {
    Mean(f64),
    Category(AqiCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center: GeoPoint,
    pub projection_scale: f64,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: GeoPoint { lat: 0.0, lon: 0.0 },
            projection_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRow {
    pub country: String,
    /// None when the country has no boundary feature (rendered uncoloured)
    pub color_value: Option<ColorValue>,
    /// Fill colour for categorical colouring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Border emphasis for countries in the click selection
    pub highlighted: bool,
    pub georeferenced: bool,
    pub observations: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapView {
    pub rows: Vec<MapRow>,
    pub viewport: MapViewport,
    /// Countries present in the data but missing from the boundary set
    pub unmatched: Vec<String>,
    pub encoding: ChartEncoding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCountryRow {
    pub rank: usize,
    pub country: String,
    pub mean_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal_category: Option<AqiCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopNView {
    pub rows: Vec<TopCountryRow>,
    /// Top-ranked country, offered as the default country selection
    pub leader: Option<String>,
    pub encoding: ChartEncoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub country: String,
    pub points: Vec<TrendPoint>,
    /// Centred moving average, one entry per raw point
    pub rolling: Vec<TrendPoint>,
    /// Least-squares line over time, one entry per raw point
    pub regression: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendView {
    pub series: Vec<TrendSeries>,
    pub half_width: usize,
    pub metric: TrendMetric,
    pub encoding: ChartEncoding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub country: String,
    pub pollutant: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryView {
    pub rows: Vec<SummaryRow>,
    pub encoding: ChartEncoding,
}

/// Choices offered by the region and country filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub countries: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// UI Events
// ─────────────────────────────────────────────────────────────────────────────

/// Events produced by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    SetPollutant {
        pollutant: String,
    },
    SetRegions {
        regions: Vec<String>,
    },
    SetCountries {
        countries: Vec<String>,
    },
    SetDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Month/year dropdown form of a date range
    SetMonthRange {
        start_year: i32,
        start_month: u32,
        end_year: i32,
        end_month: u32,
    },
    MapClick {
        country: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapColorMode {
    MeanValue,
    #[default]
    ModalCategory,
}

/// Which measurement the trend chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Value,
    #[default]
    Aqi,
}

pub const DEFAULT_TOP_N_LIMIT: usize = 15;
pub const DEFAULT_ROLLING_HALF_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// CSV dataset loaded at startup
    #[serde(default)]
    pub data_path: String,
    /// GeoJSON FeatureCollection of country boundaries
    #[serde(default)]
    pub boundaries_path: Option<String>,
    #[serde(default = "default_pollutant")]
    pub default_pollutant: String,
    #[serde(default = "default_top_n_limit")]
    pub top_n_limit: usize,
    #[serde(default = "default_rolling_half_width")]
    pub rolling_half_width: usize,
    #[serde(default)]
    pub map_color_mode: MapColorMode,
    #[serde(default)]
    pub trend_metric: TrendMetric,
    /// Replace the country filter with the top-ranked country whenever it changes
    #[serde(default = "default_true")]
    pub follow_top_country: bool,
}

fn default_pollutant() -> String {
    "PM2.5".to_string()
}

fn default_top_n_limit() -> usize {
    DEFAULT_TOP_N_LIMIT
}

fn default_rolling_half_width() -> usize {
    DEFAULT_ROLLING_HALF_WIDTH
}

fn default_true() -> bool {
    true
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: String::new(),
            boundaries_path: None,
            default_pollutant: default_pollutant(),
            top_n_limit: default_top_n_limit(),
            rolling_half_width: default_rolling_half_width(),
            map_color_mode: MapColorMode::default(),
            trend_metric: TrendMetric::default(),
            follow_top_country: true,
        }
    }
}

impl DashboardConfig {
    pub fn with_data_path(data_path: impl Into<String>) -> Self {
        Self {
            data_path: data_path.into(),
            ..Default::default()
        }
    }
}
