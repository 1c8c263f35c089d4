use std::{path::PathBuf, time::Duration};

use nearby_core::model::DiscoveryError;
use nearby_osm::collection::OverpassError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error("Error reading configuration from '{path}': {message}")]
    ConfigError { path: PathBuf, message: String },
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Overpass(#[from] OverpassError),
    #[error("Error creating a runtime to handle async code: {0}")]
    TokioError(String),
    #[error("Timed out after {0:?} waiting for live discovery results")]
    Timeout(Duration),
    #[error("Serializing places failed: {0}")]
    SerializationError(String),
    #[error("{0}")]
    InternalError(String),
}
