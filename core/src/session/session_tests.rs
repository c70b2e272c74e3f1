//! Session-level tests against the CSV and GeoJSON fixtures.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use chrono::NaiveDate;

use super::DashboardSession;
use crate::dataset::{Dataset, LoadOptions};
use crate::filter::{FilterChange, FilterState};
use crate::geo::BoundaryIndex;
use crate::selection::SelectionState;
use crate::signals::{DashboardSignal, SignalHandler};
use crate::views::{DashboardViews, ViewKind};
use airwatch_types::{DashboardConfig, DateRange, UiEvent};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture_dataset() -> Arc<Dataset> {
    let path = Path::new("../integration-tests/fixtures/air_quality.csv");
    Arc::new(Dataset::load(path, &LoadOptions::default()).expect("Failed to load fixture dataset"))
}

fn fixture_boundaries() -> Arc<BoundaryIndex> {
    let path = Path::new("../integration-tests/fixtures/boundaries.geojson");
    Arc::new(BoundaryIndex::load(path).expect("Failed to load fixture boundaries"))
}

fn manual_config() -> DashboardConfig {
    DashboardConfig {
        follow_top_country: false,
        ..Default::default()
    }
}

fn year_2020() -> UiEvent {
    UiEvent::SetDateRange {
        start: date(2020, 1, 1),
        end: date(2020, 12, 31),
    }
}

fn ranking(views: &DashboardViews) -> Vec<(String, f64)> {
    views
        .top_n
        .rows
        .iter()
        .map(|r| (r.country.clone(), r.mean_value))
        .collect()
}

fn recomputed(signals: &[DashboardSignal]) -> Vec<ViewKind> {
    signals
        .iter()
        .find_map(|s| match s {
            DashboardSignal::ViewsRecomputed { views } => Some(views.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn test_initial_views_follow_leader() {
    let session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), DashboardConfig::default());
    let filters = session.filters();

    assert_eq!(filters.pollutant, "PM2.5");
    assert_eq!(filters.date_range, DateRange::new(date(2020, 1, 5), date(2021, 6, 1)));

    let views = session.views();
    assert_eq!(views.top_n.leader.as_deref(), Some("India"));
    assert_eq!(views.top_n.rows.len(), 7);
    assert!(filters.countries.contains("India") && filters.countries.len() == 1);

    assert_eq!(views.trend.series.len(), 1);
    assert_eq!(views.trend.series[0].country, "India");

    let summary = &views.summary.rows[0];
    assert_eq!(summary.country, "India");
    assert_eq!((summary.min, summary.max, summary.mean, summary.count), (80.0, 100.0, 90.0, 2));
    assert_eq!(summary.unit, "µg/m³");
}

#[test]
fn test_asia_2020_ranking() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    session.apply(year_2020());
    session.apply(UiEvent::SetRegions {
        regions: vec!["Asia".into()],
    });

    assert_eq!(
        ranking(session.views()),
        vec![
            ("India".to_string(), 90.0),
            ("Korea, Republic of".to_string(), 35.0),
            ("Japan".to_string(), 22.5),
        ]
    );
    assert_eq!(session.views().map.viewport.projection_scale, 1.5);
    assert_eq!(session.views().options.countries, vec!["India", "Japan", "Korea, Republic of"]);
}

#[test]
fn test_region_change_routing() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    let trend_before = session.views().trend.clone();

    let signals = session.apply(UiEvent::SetRegions {
        regions: vec!["Europe".into()],
    });
    assert_eq!(recomputed(&signals), vec![ViewKind::TopN, ViewKind::Map, ViewKind::Options]);
    assert_eq!(session.views().trend, trend_before);
    assert_eq!(session.views().top_n.leader.as_deref(), Some("France"));
    // not following: the leader is announced but the country filter is untouched
    assert!(signals.contains(&DashboardSignal::DefaultCountry {
        country: "France".into()
    }));
    assert!(session.filters().countries.is_empty());
}

#[test]
fn test_country_change_leaves_ranking_alone() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    let top_before = session.views().top_n.clone();
    let map_before = session.views().map.clone();

    let signals = session.apply(UiEvent::SetCountries {
        countries: vec!["Japan".into(), "France".into()],
    });
    assert_eq!(recomputed(&signals), vec![ViewKind::Trend, ViewKind::Summary]);
    assert_eq!(session.views().top_n, top_before);
    assert_eq!(session.views().map, map_before);

    let countries: Vec<_> = session.views().summary.rows.iter().map(|r| r.country.as_str()).collect();
    assert_eq!(countries, vec!["Japan", "France"]);
}

#[test]
fn test_leader_change_updates_country_filter() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), DashboardConfig::default());

    let signals = session.apply(UiEvent::SetRegions {
        regions: vec!["Europe".into()],
    });

    assert!(signals.contains(&DashboardSignal::DefaultCountry {
        country: "France".into()
    }));
    assert!(signals.iter().any(|s| matches!(
        s,
        DashboardSignal::FiltersChanged {
            change: FilterChange::Countries,
            ..
        }
    )));
    assert_eq!(
        recomputed(&signals),
        vec![
            ViewKind::TopN,
            ViewKind::Map,
            ViewKind::Options,
            ViewKind::Trend,
            ViewKind::Summary
        ]
    );
    assert_eq!(session.views().trend.series[0].country, "France");
    assert_eq!(session.views().summary.rows[0].country, "France");
}

#[test]
fn test_unchanged_leader_keeps_user_countries() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), DashboardConfig::default());
    session.apply(UiEvent::SetCountries {
        countries: vec!["Japan".into()],
    });

    // India still leads Asia, so the user's choice stands
    let signals = session.apply(UiEvent::SetRegions {
        regions: vec!["Asia".into()],
    });
    assert!(!signals.iter().any(|s| matches!(s, DashboardSignal::DefaultCountry { .. })));
    assert!(session.filters().countries.contains("Japan"));
}

#[test]
fn test_map_click_toggles_highlight_only() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    let before = session.views().clone();

    let signals = session.apply(UiEvent::MapClick {
        country: "Japan".into(),
    });
    assert!(signals.contains(&DashboardSignal::SelectionToggled {
        country: "Japan".into(),
        state: SelectionState::Selected,
    }));
    assert!(recomputed(&signals).is_empty());

    let japan = session.views().map.rows.iter().find(|r| r.country == "Japan").unwrap();
    assert!(japan.highlighted);
    assert_eq!(session.views().top_n, before.top_n);

    session.apply(UiEvent::MapClick {
        country: "Japan".into(),
    });
    assert_eq!(*session.views(), before);
    assert!(session.filters().selected_countries.is_empty());
}

#[test]
fn test_inverted_date_range_empties_views() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    let signals = session.apply(UiEvent::SetDateRange {
        start: date(2020, 12, 31),
        end: date(2020, 1, 1),
    });

    assert!(signals.iter().any(|s| matches!(s, DashboardSignal::InvalidDateRange { .. })));
    for kind in ViewKind::ALL {
        assert!(session.views().is_empty(kind), "{kind:?} should be empty");
        assert!(signals.contains(&DashboardSignal::EmptyResult { view: kind }));
    }
    assert_eq!(session.views().top_n.leader, None);
}

#[test]
fn test_month_range_event() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    session.apply(UiEvent::SetMonthRange {
        start_year: 2020,
        start_month: 1,
        end_year: 2020,
        end_month: 1,
    });
    assert_eq!(
        session.filters().date_range,
        DateRange::new(date(2020, 1, 1), date(2020, 1, 31))
    );
    // India's February reading falls outside January
    assert_eq!(session.views().top_n.rows[0].mean_value, 80.0);

    let signals = session.apply(UiEvent::SetMonthRange {
        start_year: 2020,
        start_month: 13,
        end_year: 2020,
        end_month: 1,
    });
    assert!(signals.is_empty());
}

#[test]
fn test_unmatched_countries_are_signalled() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    assert_eq!(session.views().map.unmatched, vec!["Germany".to_string()]);

    let signals = session.apply(year_2020());
    assert!(signals.contains(&DashboardSignal::MissingJoinKey {
        country: "Germany".into()
    }));
    let korea = session
        .views()
        .map
        .rows
        .iter()
        .find(|r| r.country == "Korea, Republic of")
        .unwrap();
    assert!(korea.georeferenced);
}

#[test]
fn test_repeated_event_is_a_no_op() {
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    assert!(!session.apply(year_2020()).is_empty());
    let version = session.version();
    assert!(session.apply(year_2020()).is_empty());
    assert_eq!(session.version(), version);
}

#[test]
fn test_sessions_are_independent() {
    let dataset = fixture_dataset();
    let boundaries = fixture_boundaries();
    let mut first = DashboardSession::new(Arc::clone(&dataset), Arc::clone(&boundaries), manual_config());
    let second = DashboardSession::new(dataset, boundaries, manual_config());

    first.apply(UiEvent::SetPollutant {
        pollutant: "NO2".into(),
    });
    assert_eq!(first.filters().pollutant, "NO2");
    assert_eq!(second.filters().pollutant, "PM2.5");
    assert_eq!(first.views().top_n.leader.as_deref(), Some("India"));
    assert_eq!(first.views().top_n.rows.len(), 2);
    assert_eq!(second.views().top_n.rows.len(), 7);
}

#[test]
fn test_explicit_filters_and_permissive_boundaries() {
    let filters = FilterState::new("PM2.5", DateRange::new(date(2020, 1, 1), date(2020, 12, 31)))
        .with_regions(["Europe"]);
    let session = DashboardSession::with_filters(
        fixture_dataset(),
        Arc::new(BoundaryIndex::empty()),
        manual_config(),
        filters,
    );
    assert!(session.views().map.unmatched.is_empty());
    assert_eq!(
        ranking(session.views()),
        vec![("France".to_string(), 15.0), ("Germany".to_string(), 13.0)]
    );
}

struct Recorder(Rc<RefCell<Vec<DashboardSignal>>>);

impl SignalHandler for Recorder {
    fn handle_signal(&mut self, signal: &DashboardSignal, _views: &DashboardViews) {
        self.0.borrow_mut().push(signal.clone());
    }
}

#[test]
fn test_signal_handlers_receive_every_signal() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut session = DashboardSession::new(fixture_dataset(), fixture_boundaries(), manual_config());
    session.add_signal_handler(Box::new(Recorder(Rc::clone(&seen))));

    let signals = session.apply(UiEvent::SetPollutant {
        pollutant: "NO2".into(),
    });
    assert_eq!(*seen.borrow(), signals);
    assert!(matches!(
        signals.first(),
        Some(DashboardSignal::FiltersChanged {
            change: FilterChange::Pollutant,
            version: 1
        })
    ));
}
