use std::time::Duration;

use nearby_core::model::{DiscoveryError, PlaceCategory};
use serde::{Deserialize, Serialize};

use crate::model::{curated::PlaceFilter, geo::WatchOptions};

pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// user-facing discovery configuration. every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// live search radius around the user, in kilometers
    pub radius_km: Option<f64>,
    /// initial category filter
    pub category: Option<PlaceCategory>,
    /// filter for the radius-less curated fetch made while live mode is off
    pub base_filter: Option<PlaceFilter>,
    /// when the realtime channel is unavailable, re-fetch curated places this often
    pub refetch_interval_secs: Option<u64>,
    pub watch: Option<WatchOptions>,
}

/// validated discovery settings
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverySettings {
    pub radius_km: f64,
    pub category: Option<PlaceCategory>,
    pub base_filter: PlaceFilter,
    pub refetch_interval: Option<Duration>,
    pub watch_options: WatchOptions,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            category: None,
            base_filter: PlaceFilter::default(),
            refetch_interval: None,
            watch_options: WatchOptions::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn build(&self) -> Result<DiscoverySettings, DiscoveryError> {
        let radius_km = self.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(DiscoveryError::InvalidUserInput(format!(
                "discovery radius_km must be a positive number, found {radius_km}"
            )));
        }
        let refetch_interval = match self.refetch_interval_secs {
            Some(0) => {
                return Err(DiscoveryError::InvalidUserInput(String::from(
                    "refetch_interval_secs must be positive, omit it to disable re-fetching",
                )))
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };
        Ok(DiscoverySettings {
            radius_km,
            category: self.category,
            base_filter: self.base_filter.clone().unwrap_or_default(),
            refetch_interval,
            watch_options: self.watch.unwrap_or_default(),
        })
    }
}
