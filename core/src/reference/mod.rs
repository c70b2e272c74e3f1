//! Static lookup tables: category colours, region map centres and country
//! name aliases.

use phf::phf_map;

use airwatch_types::{AqiCategory, GeoPoint};

/// Fill colour per AQI category label
static CATEGORY_FILLS: phf::Map<&'static str, &'static str> = phf_map! {
    "Good" => "#98FB98",                           // Pale Green
    "Moderate" => "#FFFF99",                       // Light Yellow
    "Unhealthy for Sensitive Groups" => "#FFD700", // Gold
    "Unhealthy" => "#FFA500",                      // Orange
    "Very Unhealthy" => "#FF6347",                 // Tomato Red
    "Hazardous" => "#B22222",                      // Firebrick Red
};

/// Map centre (lat, lon) used when exactly one region is selected
static REGION_CENTERS: phf::Map<&'static str, (f64, f64)> = phf_map! {
    "Asia" => (34.0479, 100.6197),
    "Europe" => (54.5260, 15.2551),
    "Africa" => (-8.7832, 34.5085),
    "North America" => (54.5260, -105.2551),
    "South America" => (-8.7832, -55.4915),
    "Australia" => (-25.2744, 133.7751),
    "Oceania" => (-25.2744, 133.7751),
};

/// Normalised name variant -> canonical normalised key.
/// Keys and values are already in `country_key` form.
static COUNTRY_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "united states of america" => "united states",
    "usa" => "united states",
    "us" => "united states",
    "russian federation" => "russia",
    "czech republic" => "czechia",
    "korea republic of" => "south korea",
    "republic of korea" => "south korea",
    "s korea" => "south korea",
    "korea democratic peoples republic of" => "north korea",
    "iran islamic republic of" => "iran",
    "viet nam" => "vietnam",
    "turkiye" => "turkey",
    "türkiye" => "turkey",
    "united kingdom of great britain and northern ireland" => "united kingdom",
    "uk" => "united kingdom",
    "the netherlands" => "netherlands",
    "bolivia plurinational state of" => "bolivia",
    "lao peoples democratic republic" => "laos",
    "syrian arab republic" => "syria",
    "macedonia" => "north macedonia",
    "republic of north macedonia" => "north macedonia",
    "swaziland" => "eswatini",
    "republic of serbia" => "serbia",
    "united republic of tanzania" => "tanzania",
    "tanzania united republic of" => "tanzania",
    "the bahamas" => "bahamas",
    "ivory coast" => "côte divoire",
    "cote divoire" => "côte divoire",
    "taiwan province of china" => "taiwan",
    "hong kong sar" => "hong kong",
    "hong kong sar china" => "hong kong",
};

pub fn category_fill(category: AqiCategory) -> &'static str {
    CATEGORY_FILLS
        .get(category.label())
        .copied()
        .unwrap_or("#D3D3D3")
}

pub fn region_center(region: &str) -> Option<GeoPoint> {
    REGION_CENTERS
        .get(region)
        .map(|&(lat, lon)| GeoPoint { lat, lon })
}

/// Normalised join key for a country display name.
///
/// Lowercases, drops punctuation, collapses whitespace and folds known
/// variants ("Russian Federation", "Korea, Republic of") onto one key.
pub fn country_key(name: &str) -> String {
    let cleaned: String = name
        .replace('&', " and ")
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    let key = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    match COUNTRY_ALIASES.get(key.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_fill() {
        for category in AqiCategory::ALL {
            assert!(category_fill(category).starts_with('#'));
        }
        assert_eq!(category_fill(AqiCategory::Hazardous), "#B22222");
    }

    #[test]
    fn region_centers_lookup() {
        let asia = region_center("Asia").unwrap();
        assert!((asia.lat - 34.0479).abs() < 1e-9);
        assert!(region_center("Atlantis").is_none());
    }

    #[test]
    fn country_keys_fold_variants() {
        assert_eq!(country_key("  India "), "india");
        assert_eq!(country_key("United States of America"), "united states");
        assert_eq!(country_key("Korea, Republic of"), "south korea");
        assert_eq!(country_key("S. Korea"), "south korea");
        assert_eq!(country_key("Côte d'Ivoire"), "côte divoire");
        assert_eq!(country_key("Cote d'Ivoire"), "côte divoire");
        assert_eq!(country_key("Trinidad & Tobago"), "trinidad and tobago");
    }
}
