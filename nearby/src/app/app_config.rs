use std::path::Path;

use config::{Config, File};
use nearby_osm::collection::OverpassCollectorConfig;
use serde::{Deserialize, Serialize};

use super::AppError;
use crate::model::{curated::CuratedBackendConfig, discovery::DiscoveryConfig};

/// contents of a nearby configuration file. see `nearby-config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub curated: CuratedBackendConfig,
    #[serde(default)]
    pub overpass: OverpassCollectorConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl TryFrom<&Path> for AppConfig {
    type Error = AppError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let config = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| AppError::ConfigError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config
            .try_deserialize::<AppConfig>()
            .map_err(|e| AppError::ConfigError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}
