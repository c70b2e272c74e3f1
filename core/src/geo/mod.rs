//! Country boundary lookup for the choropleth join.
//!
//! Boundaries come from a GeoJSON FeatureCollection. Features are indexed by
//! the normalised key of their `admin` name, with `name` and `iso_a3` as
//! extra aliases, so dataset names like "Korea, Republic of" still find the
//! "South Korea" feature.

mod error;

pub use error::BoundaryError;

use std::path::Path;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::reference::country_key;

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<RawProperties>,
    #[serde(default)]
    geometry: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(default, alias = "ADMIN")]
    admin: Option<String>,
    #[serde(default, alias = "NAME")]
    name: Option<String>,
    #[serde(default, alias = "ISO_A3")]
    iso_a3: Option<String>,
}

/// One country outline, geometry kept as raw GeoJSON for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub admin: String,
    pub iso_a3: Option<String>,
    pub geometry: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct BoundaryIndex {
    features: Vec<BoundaryFeature>,
    by_key: HashMap<String, usize>,
    permissive: bool,
}

impl BoundaryIndex {
    /// Index with no geometry that matches every country.
    pub fn empty() -> Self {
        Self {
            permissive: true,
            ..Default::default()
        }
    }

    pub fn from_geojson_str(json: &str) -> Result<Self, BoundaryError> {
        let raw: RawCollection = serde_json::from_str(json)?;
        if raw.kind != "FeatureCollection" {
            return Err(BoundaryError::NotFeatureCollection { found: raw.kind });
        }

        let mut index = Self::default();
        let mut skipped = 0usize;
        for feature in raw.features {
            let props = feature.properties.unwrap_or_default();
            let Some(admin) = props.admin.or_else(|| props.name.clone()) else {
                skipped += 1;
                continue;
            };
            // Natural Earth uses "-99" for territories without a code
            let iso_a3 = props.iso_a3.filter(|code| code != "-99");

            let slot = index.features.len();
            let mut aliases = vec![country_key(&admin)];
            aliases.extend(props.name.as_deref().map(country_key));
            aliases.extend(iso_a3.as_deref().map(country_key));
            for key in aliases {
                if !key.is_empty() {
                    index.by_key.entry(key).or_insert(slot);
                }
            }

            index.features.push(BoundaryFeature {
                admin,
                iso_a3,
                geometry: feature.geometry,
            });
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Boundary features without a name were skipped");
        }
        Ok(index)
    }

    pub fn load(path: &Path) -> Result<Self, BoundaryError> {
        let json = std::fs::read_to_string(path).map_err(|source| BoundaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_geojson_str(&json)?;
        tracing::info!(path = %path.display(), features = index.len(), "Loaded boundaries");
        Ok(index)
    }

    /// Whether `country` can be drawn. Always true for [`BoundaryIndex::empty`].
    pub fn contains(&self, country: &str) -> bool {
        self.permissive || self.feature(country).is_some()
    }

    pub fn feature(&self, country: &str) -> Option<&BoundaryFeature> {
        self.by_key
            .get(country_key(country).as_str())
            .map(|&slot| &self.features[slot])
    }

    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn is_permissive(&self) -> bool {
        self.permissive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> BoundaryIndex {
        BoundaryIndex::load(Path::new("../integration-tests/fixtures/boundaries.geojson"))
            .expect("fixture should load")
    }

    #[test]
    fn test_load_fixture() {
        let index = fixture();
        assert_eq!(index.len(), 6);
        assert!(!index.is_permissive());
        assert!(index.contains("India"));
        assert!(!index.contains("Germany"));
    }

    #[test]
    fn test_alias_and_variant_names_join() {
        let index = fixture();
        assert_eq!(index.feature("Korea, Republic of").unwrap().admin, "South Korea");
        assert_eq!(index.feature("United States").unwrap().admin, "United States of America");
        assert_eq!(index.feature("USA").unwrap().admin, "United States of America");
        assert_eq!(index.feature("  japan ").unwrap().iso_a3.as_deref(), Some("JPN"));
        assert_eq!(index.feature("kor").unwrap().admin, "South Korea");
    }

    #[test]
    fn test_unnamed_features_are_skipped() {
        let index = fixture();
        assert!(index.features().iter().all(|f| !f.admin.is_empty()));
        assert!(index.feature("-99").is_none());
    }

    #[test]
    fn test_empty_index_is_permissive() {
        let index = BoundaryIndex::empty();
        assert!(index.is_empty());
        assert!(index.contains("Atlantis"));
        assert!(index.feature("Atlantis").is_none());
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = BoundaryIndex::from_geojson_str(r#"{"type": "Feature", "properties": {}}"#).unwrap_err();
        assert!(matches!(err, BoundaryError::NotFeatureCollection { ref found } if found == "Feature"));

        let err = BoundaryIndex::from_geojson_str("not json").unwrap_err();
        assert!(matches!(err, BoundaryError::Json(_)));
    }

    #[test]
    fn test_uppercase_property_names() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"ADMIN": "Russia", "ISO_A3": "RUS"}, "geometry": null}
        ]}"#;
        let index = BoundaryIndex::from_geojson_str(json).unwrap();
        assert!(index.contains("Russian Federation"));
    }
}
