use std::time::{Duration, Instant};

use async_trait::async_trait;
use nearby_core::model::{CommunityPlaceSource, Coordinates, DiscoveryError, Place};

use super::{
    elements_to_places, CommunityRatingPolicy, OverpassCollectorConfig, OverpassError,
    OverpassQuery, OverpassResponse,
};

// extra time granted to the HTTP request beyond the server-side query timeout
const REQUEST_GRACE_SECS: u64 = 5;

/// queries an Overpass interpreter for community places around a point.
#[derive(Debug, Clone)]
pub struct OverpassCollector {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
    result_limit: usize,
    rating_policy: CommunityRatingPolicy,
}

impl TryFrom<OverpassCollectorConfig> for OverpassCollector {
    type Error = OverpassError;

    fn try_from(value: OverpassCollectorConfig) -> Result<Self, Self::Error> {
        value.build()
    }
}

impl OverpassCollector {
    pub fn new(
        endpoint: String,
        timeout_secs: u64,
        result_limit: usize,
        rating_policy: CommunityRatingPolicy,
    ) -> Result<Self, OverpassError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs + REQUEST_GRACE_SECS))
            .user_agent(concat!("nearby/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OverpassError::ClientError(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            timeout_secs,
            result_limit,
            rating_policy,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// run one bounded-radius query and map the response into places.
    pub async fn collect(
        &self,
        center: Coordinates,
        radius_meters: f64,
    ) -> Result<Vec<Place>, OverpassError> {
        if !center.is_valid() {
            return Err(OverpassError::InvalidUserInput(format!(
                "query center {center} is not a valid position"
            )));
        }
        if !(radius_meters.is_finite() && radius_meters > 0.0) {
            return Err(OverpassError::InvalidUserInput(format!(
                "query radius must be a positive number of meters, found {radius_meters}"
            )));
        }

        let query = OverpassQuery::new(center, radius_meters, self.timeout_secs, self.result_limit);
        log::debug!("Overpass query:\n{query}");
        let start = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OverpassError::StatusError {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        let parsed: OverpassResponse = serde_json::from_slice(&body)
            .map_err(|e| OverpassError::DeserializeError(e.to_string()))?;

        // Overpass reports runtime timeouts in-band with a 200 status
        if let Some(remark) = parsed.remark.as_ref().filter(|r| r.contains("timed out")) {
            return Err(OverpassError::Timeout {
                endpoint: format!("{} ({remark})", self.endpoint),
                seconds: self.timeout_secs,
            });
        }

        let places = elements_to_places(&parsed.elements, &self.rating_policy);
        log::info!(
            "collected {} community places from {} elements near {center} in {:?}",
            places.len(),
            parsed.elements.len(),
            start.elapsed()
        );
        Ok(places)
    }

    fn request_error(&self, error: reqwest::Error) -> OverpassError {
        if error.is_timeout() {
            OverpassError::Timeout {
                endpoint: self.endpoint.clone(),
                seconds: self.timeout_secs + REQUEST_GRACE_SECS,
            }
        } else {
            OverpassError::RequestError {
                endpoint: self.endpoint.clone(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl CommunityPlaceSource for OverpassCollector {
    async fn try_query(
        &self,
        center: Coordinates,
        radius_meters: f64,
    ) -> Result<Vec<Place>, DiscoveryError> {
        self.collect(center, radius_meters)
            .await
            .map_err(DiscoveryError::from)
    }
}
