//! Error types for dataset loading and map operations.

use mapgen::FontError;
use thiserror::Error;

/// Problems found while reading a region dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature #{0} has no name")]
    MissingName(usize),

    #[error("region '{0}' has no polygons")]
    NoPolygons(String),

    #[error("region '{name}' has a non-finite coordinate")]
    NonFinite { name: String },

    #[error("region '{name}': {reason}")]
    Coordinates { name: String, reason: String },

    #[error("region '{name}': compressed ring {reason}")]
    Encoding { name: String, reason: String },
}

/// Failures of map-level operations.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map dataset is missing")]
    MissingDataset,

    #[error("no region with id {0}")]
    UnknownRegionId(usize),

    #[error("font failed to load: {0}")]
    Font(#[from] FontError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
