use super::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use tracing::info;

const FEATURE_COLLECTION: &str = "FeatureCollection";

/// Neighbourhood outlines as a GeoJSON FeatureCollection.
///
/// Geometry is carried through untouched; it is only ever drawn as an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodBoundaries {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<BoundaryFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFeature {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    geometry: Value,
}

impl NeighbourhoodBoundaries {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| LoadError::io(path, err))?;
        let boundaries = Self::from_reader(file).map_err(|err| match err {
            BoundaryParseError::Json(source) => LoadError::GeoJson {
                path: path.to_path_buf(),
                source,
            },
            BoundaryParseError::NotFeatureCollection(found) => LoadError::NotFeatureCollection {
                path: path.to_path_buf(),
                found,
            },
        })?;

        info!(
            path = %path.display(),
            features = boundaries.len(),
            "neighbourhood boundaries loaded"
        );
        Ok(boundaries)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BoundaryParseError> {
        let reader = std::io::BufReader::new(reader);
        let boundaries: Self =
            serde_json::from_reader(reader).map_err(BoundaryParseError::Json)?;
        if boundaries.kind != FEATURE_COLLECTION {
            return Err(BoundaryParseError::NotFeatureCollection(boundaries.kind));
        }
        Ok(boundaries)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundaryParseError {
    #[error("invalid GeoJSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("expected a FeatureCollection, found '{0}'")]
    NotFeatureCollection(String),
}
