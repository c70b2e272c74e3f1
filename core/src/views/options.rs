use crate::dataset::{Dataset, distinct};
use crate::filter::FilterState;
use airwatch_types::FilterOptions;

/// Continents with data for the pollutant and dates, in first-appearance order.
pub fn region_options(dataset: &Dataset, filters: &FilterState) -> Vec<String> {
    let scope = filters.base_scope();
    distinct(dataset.filter(&scope).map(|r| r.continent))
        .into_iter()
        .map(String::from)
        .collect()
}

/// Countries with data for the pollutant, dates and selected regions.
pub fn country_options(dataset: &Dataset, filters: &FilterState) -> Vec<String> {
    let scope = filters.region_scope();
    distinct(dataset.filter(&scope).map(|r| r.country))
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn filter_options(dataset: &Dataset, filters: &FilterState) -> FilterOptions {
    FilterOptions {
        regions: region_options(dataset, filters),
        countries: country_options(dataset, filters),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::dataset::Record;
    use airwatch_types::DateRange;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new("France", "Europe", "PM2.5", date(2020, 1, 1), 15.0, "µg/m³"),
            Record::new("India", "Asia", "PM2.5", date(2020, 1, 1), 80.0, "µg/m³"),
            Record::new("Japan", "Asia", "PM2.5", date(2020, 1, 1), 20.0, "µg/m³"),
            Record::new("Chile", "South America", "PM2.5", date(2021, 1, 1), 30.0, "µg/m³"),
            Record::new("Germany", "Europe", "NO2", date(2020, 1, 1), 30.0, "µg/m³"),
        ])
    }

    fn filters() -> FilterState {
        FilterState::new("PM2.5", DateRange::new(date(2020, 1, 1), date(2020, 12, 31)))
    }

    #[test]
    fn regions_ignore_the_region_filter() {
        let state = filters().with_regions(["Asia"]);
        assert_eq!(region_options(&dataset(), &state), vec!["Europe", "Asia"]);
    }

    #[test]
    fn countries_narrow_with_regions() {
        assert_eq!(country_options(&dataset(), &filters()), vec!["France", "India", "Japan"]);

        let asia = filters().with_regions(["Asia"]);
        let options = filter_options(&dataset(), &asia);
        assert_eq!(options.countries, vec!["India", "Japan"]);
        assert_eq!(options.regions.len(), 2);
    }

    #[test]
    fn selected_countries_do_not_narrow_options() {
        let state = filters().with_countries(["India"]);
        assert_eq!(country_options(&dataset(), &state).len(), 3);
    }
}
