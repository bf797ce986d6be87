mod artifact;
mod boundaries;
mod listings;
mod lookup;

use std::path::PathBuf;

pub use artifact::ModelArtifact;
pub use boundaries::{BoundaryFeature, BoundaryParseError, NeighbourhoodBoundaries};
pub use listings::ListingsTable;
pub use lookup::load_lookup;

/// Failure reading one of the explorer's source files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid GeoJSON in {}: {source}", path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} is not a GeoJSON FeatureCollection (found '{found}')", path.display())]
    NotFeatureCollection { path: PathBuf, found: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
