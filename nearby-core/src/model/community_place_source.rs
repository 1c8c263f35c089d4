use async_trait::async_trait;

use super::{Coordinates, DiscoveryError, Place};

/// a third-party source of places around a point. results are replaced
/// wholesale on every query, there are no incremental updates.
#[async_trait]
pub trait CommunityPlaceSource: Send + Sync {
    /// query places within `radius_meters` of `center`.
    async fn try_query(
        &self,
        center: Coordinates,
        radius_meters: f64,
    ) -> Result<Vec<Place>, DiscoveryError>;

    /// same as [`CommunityPlaceSource::try_query`] but a failure or timeout
    /// degrades to an empty list so the caller can proceed with curated-only results.
    async fn query(&self, center: Coordinates, radius_meters: f64) -> Vec<Place> {
        match self.try_query(center, radius_meters).await {
            Ok(places) => places,
            Err(e) => {
                log::warn!("{e}, continuing without community places near {center}");
                vec![]
            }
        }
    }
}
