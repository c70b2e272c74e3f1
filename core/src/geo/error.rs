//! Error types for boundary loading

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("failed to read boundary file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON")]
    Json(#[from] serde_json::Error),

    #[error("expected a FeatureCollection, found {found}")]
    NotFeatureCollection { found: String },
}
