use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a generation run.
///
/// Recoverable conditions (a building with no free spot, an empty prefab pool)
/// never surface here; they are logged where they happen.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("terrain is missing or has no usable raster")]
    MissingTerrain,

    #[error(
        "degenerate bounding box: lat [{min_lat}, {max_lat}], lon [{min_lon}, {max_lon}] \
         (single-feature or empty dataset?)"
    )]
    DegenerateBounds {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },

    #[error("missing required {category} input file {path:?}")]
    MissingInput {
        category: &'static str,
        path: Option<PathBuf>,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: invalid GeoJSON: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file}: feature #{feature}: malformed coordinates: {reason}")]
    MalformedInput {
        file: String,
        feature: usize,
        reason: String,
    },

    #[error("invalid config: {0}")]
    Config(String),
}

impl GenError {
    /// Configuration-class failures: detected before any input is decoded.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            GenError::MissingTerrain
                | GenError::DegenerateBounds { .. }
                | GenError::MissingInput { .. }
                | GenError::Config(_)
        )
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, GenError::Json { .. } | GenError::MalformedInput { .. })
    }
}
