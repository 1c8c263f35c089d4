use serde::{Deserialize, Serialize};

use super::{CommunityRatingPolicy, OverpassCollector, OverpassError};

pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Serializable configuration for the Overpass community place source.
/// Builds to a [`OverpassCollector`]
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OverpassCollectorConfig {
    // Overpass interpreter URL. Defaults to the public overpass-api.de instance
    pub endpoint: Option<String>,
    // Server-side query timeout, also bounds the HTTP request. Defaults to 25
    pub timeout_secs: Option<u64>,
    // Maximum number of elements returned per query. Defaults to 60
    pub result_limit: Option<usize>,
    pub rating_policy: Option<CommunityRatingPolicy>,
}

impl OverpassCollectorConfig {
    pub fn new(
        endpoint: Option<String>,
        timeout_secs: Option<u64>,
        result_limit: Option<usize>,
        rating_policy: Option<CommunityRatingPolicy>,
    ) -> Self {
        Self {
            endpoint,
            timeout_secs,
            result_limit,
            rating_policy,
        }
    }

    pub fn build(&self) -> Result<OverpassCollector, OverpassError> {
        let timeout_secs = self.timeout_secs.unwrap_or(25);
        if timeout_secs == 0 {
            return Err(OverpassError::InvalidUserInput(String::from(
                "overpass timeout_secs must be positive",
            )));
        }
        let result_limit = self.result_limit.unwrap_or(60);
        if result_limit == 0 {
            return Err(OverpassError::InvalidUserInput(String::from(
                "overpass result_limit must be positive",
            )));
        }
        let rating_policy = self.rating_policy.unwrap_or_default();
        rating_policy
            .validate()
            .map_err(|e| OverpassError::InvalidUserInput(format!("overpass rating_policy: {e}")))?;
        OverpassCollector::new(
            self.endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_OVERPASS_ENDPOINT.to_string()),
            timeout_secs,
            result_limit,
            rating_policy,
        )
    }
}
