use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::{DatasetError, Record};
use crate::context::intern;
use airwatch_types::AqiCategory;


/// A row that was dropped during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub line_number: u64,
    /// Name of the missing or unparseable column
    pub field: &'static str,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    country: usize,
    continent: usize,
    pollutant: usize,
    value: usize,
    unit: usize,
    time: usize,
    time_hour: Option<usize>,
    aqi: Option<usize>,
    aqi_category: Option<usize>,
}

pub struct CsvParser {
    columns: ColumnMap,
}

// lowercase with spaces, underscores and dashes removed
fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_matches('"')
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| aliases.contains(&h.as_str()))
}

fn require_column(headers: &[String], name: &'static str, aliases: &[&str]) -> Result<usize, DatasetError> {
    find_column(headers, aliases).ok_or(DatasetError::MissingColumn { name })
}

impl CsvParser {
    pub fn from_header<S: AsRef<str>>(fields: &[S]) -> Result<Self, DatasetError> {
        let headers: Vec<String> = fields.iter().map(|h| normalize_header(h.as_ref())).collect();

        let columns = ColumnMap {
            country: require_column(&headers, "countryname", &["countryname", "country"])?,
            continent: require_column(&headers, "continent", &["continent", "region"])?,
            pollutant: require_column(&headers, "pollutant", &["pollutant"])?,
            value: require_column(&headers, "value", &["value"])?,
            unit: require_column(&headers, "unit", &["unit"])?,
            time: require_column(&headers, "time", &["time", "date"])?,
            time_hour: find_column(&headers, &["timehour"]),
            aqi: find_column(&headers, &["aqi"]),
            aqi_category: find_column(&headers, &["aqicat", "aqicategory"]),
        };
        Ok(Self { columns })
    }

    /// Convert one CSV record into a typed `Record`.
    pub fn parse_record<S: AsRef<str>>(&self, line_number: u64, fields: &[S]) -> Result<Record, RowIssue> {
        let c = &self.columns;
        let issue = |field| RowIssue { line_number, field };

        let text = |idx: usize, field: &'static str| {
            fields
                .get(idx)
                .map(|f| f.as_ref().trim())
                .filter(|f| !f.is_empty())
                .ok_or(issue(field))
        };
        let optional = |idx: Option<usize>| {
            idx.and_then(|i| fields.get(i))
                .map(|f| f.as_ref().trim())
                .filter(|f| !f.is_empty())
        };

        let country = text(c.country, "country")?;
        let continent = text(c.continent, "continent")?;
        let pollutant = text(c.pollutant, "pollutant")?;
        let unit = text(c.unit, "unit")?;
        let value = parse_finite(text(c.value, "value")?).ok_or(issue("value"))?;
        let aqi = match optional(c.aqi) {
            Some(s) => Some(parse_finite(s).ok_or(issue("aqi"))?),
            None => None,
        };
        let time = parse_date(text(c.time, "time")?).ok_or(issue("time"))?;

        Ok(Record {
            country: intern(country),
            continent: intern(continent),
            pollutant: intern(pollutant),
            unit: intern(unit),
            time,
            time_hour: optional(c.time_hour).and_then(parse_time_hour),
            value,
            aqi,
            aqi_category: optional(c.aqi_category).and_then(AqiCategory::from_label),
        })
    }
}

// `f64::from_str` accepts "inf" and "NaN"
fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Date-only granularity: any timestamp is truncated to its `YYYY-MM-DD` prefix.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// RFC 3339, pandas' "YYYY-MM-DD HH:MM:SS+00:00", or naive. Offsets are
// converted to UTC and dropped.
fn parse_time_hour(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}
