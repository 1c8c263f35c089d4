use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// how community places, which carry no rating of their own, are rated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommunityRatingPolicy {
    /// leave the rating empty
    Omit,
    /// a fixed baseline plus up to `jitter` of noise. the noise is seeded by the
    /// OSM id, so the same feature is rated the same on every query.
    Placeholder { baseline: f32, jitter: f32 },
}

impl Default for CommunityRatingPolicy {
    fn default() -> Self {
        CommunityRatingPolicy::Placeholder {
            baseline: 3.5,
            jitter: 1.0,
        }
    }
}

impl CommunityRatingPolicy {
    /// baseline must be finite and jitter finite and non-negative
    pub fn validate(&self) -> Result<(), String> {
        match self {
            CommunityRatingPolicy::Omit => Ok(()),
            CommunityRatingPolicy::Placeholder { baseline, .. } if !baseline.is_finite() => {
                Err(format!("rating baseline must be a finite number, found {baseline}"))
            }
            CommunityRatingPolicy::Placeholder { jitter, .. }
                if !jitter.is_finite() || *jitter < 0.0 =>
            {
                Err(format!(
                    "rating jitter must be a finite, non-negative number, found {jitter}"
                ))
            }
            CommunityRatingPolicy::Placeholder { .. } => Ok(()),
        }
    }

    pub fn rating_for(&self, osm_id: i64) -> Option<f32> {
        match self {
            CommunityRatingPolicy::Omit => None,
            CommunityRatingPolicy::Placeholder { baseline, jitter } => {
                let noise = if *jitter > 0.0 {
                    let mut rng = StdRng::seed_from_u64(osm_id as u64);
                    rng.random_range(0.0..*jitter)
                } else {
                    0.0
                };
                let rating = (baseline + noise).clamp(0.0, 5.0);
                // one decimal, like the curated aggregate ratings
                Some((rating * 10.0).round() / 10.0)
            }
        }
    }
}
