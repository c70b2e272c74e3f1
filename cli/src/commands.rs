use std::io::Write;
use std::time::Instant;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde_json::Value;

use airwatch_core::{DashboardConfigExt, DashboardSignal};
use airwatch_types::UiEvent;

use crate::CliContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Map,
    Top,
    Trend,
    Summary,
    Options,
    All,
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// Parse `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
    let year: i32 = year.parse().map_err(|_| format!("invalid year in '{s}'"))?;
    let month: u32 = month.parse().map_err(|_| format!("invalid month in '{s}'"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month out of range in '{s}'"));
    }
    Ok((year, month))
}

pub fn load(path: Option<&str>, boundaries: Option<&str>, ctx: &mut CliContext) -> Result<(), String> {
    let timer = Instant::now();
    let dataset = ctx.load(path, boundaries)?;
    let report = dataset.report();

    println!(
        "loaded {} of {} rows in {}ms ({} dropped)",
        report.loaded,
        report.rows,
        timer.elapsed().as_millis(),
        report.dropped_count()
    );
    if let Some(bounds) = dataset.date_bounds() {
        println!("dates: {} to {}", bounds.start, bounds.end);
    }
    println!("pollutants: {}", dataset.pollutants().join(", "));
    Ok(())
}

pub fn show_report(ctx: &CliContext) -> Result<(), String> {
    let report = ctx.session()?.dataset().report();
    println!("rows: {}  loaded: {}  classified: {}", report.rows, report.loaded, report.classified);
    if report.dropped.is_empty() {
        return Ok(());
    }
    println!("{:<8} Field", "Line");
    println!("{}", "-".repeat(30));
    for issue in &report.dropped {
        println!("{:<8} {}", issue.line_number, issue.field);
    }
    Ok(())
}

pub fn show_config(ctx: &CliContext) -> Result<(), String> {
    print_json(&ctx.config)
}

pub fn save_config(ctx: &CliContext) -> Result<(), String> {
    ctx.config.clone().save().map_err(|e| e.to_string())?;
    println!("configuration saved");
    Ok(())
}

pub fn show_filters(ctx: &CliContext) -> Result<(), String> {
    print_json(&*ctx.session()?.filters())
}

pub fn show_view(view: ViewArg, ctx: &CliContext) -> Result<(), String> {
    let views = ctx.session()?.views();
    match view {
        ViewArg::Map => print_json(&views.map),
        ViewArg::Top => print_json(&views.top_n),
        ViewArg::Trend => print_json(&views.trend),
        ViewArg::Summary => print_json(&views.summary),
        ViewArg::Options => print_json(&views.options),
        ViewArg::All => print_json(views),
    }
}

/// Apply a UI event to the session and print the signals it produced.
pub fn apply(event: UiEvent, ctx: &mut CliContext) -> Result<(), String> {
    let signals = ctx.session_mut()?.apply(event);
    if signals.is_empty() {
        println!("no change");
        return Ok(());
    }
    for signal in &signals {
        println!("{}", describe(signal)?);
    }
    Ok(())
}

fn describe(signal: &DashboardSignal) -> Result<String, String> {
    let value = serde_json::to_value(signal).map_err(|e| e.to_string())?;
    let Value::Object(mut fields) = value else {
        return Ok(value.to_string());
    };
    let name = fields
        .remove("signal")
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default();
    Ok(format!("{name:<20} {}", Value::Object(fields)))
}

pub fn set_dates(start: NaiveDate, end: NaiveDate, ctx: &mut CliContext) -> Result<(), String> {
    apply(UiEvent::SetDateRange { start, end }, ctx)
}

pub fn set_months(from: (i32, u32), to: (i32, u32), ctx: &mut CliContext) -> Result<(), String> {
    apply(
        UiEvent::SetMonthRange {
            start_year: from.0,
            start_month: from.1,
            end_year: to.0,
            end_month: to.1,
        },
        ctx,
    )
}

pub fn exit() -> Result<(), String> {
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2020-01"), Ok((2020, 1)));
        assert_eq!(parse_month("2021-12"), Ok((2021, 12)));
        assert!(parse_month("2020").is_err());
        assert!(parse_month("2020-13").is_err());
        assert!(parse_month("year-01").is_err());
    }

    #[test]
    fn test_describe_strips_tag() {
        let line = describe(&DashboardSignal::DefaultCountry {
            country: "India".into(),
        })
        .unwrap();
        assert!(line.starts_with("default_country"));
        assert!(line.contains("\"country\":\"India\""));
    }
}
