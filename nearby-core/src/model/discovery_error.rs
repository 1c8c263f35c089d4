/// failures of the discovery engine. none of these are fatal: each one
/// degrades the published result to a smaller but still consistent list.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
    #[error("failed to fetch curated places: {0}")]
    BackendFetchFailed(String),
    #[error("failed to open curated realtime channel: {0}")]
    BackendSubscriptionFailed(String),
    #[error("community place query failed: {0}")]
    CommunityQueryFailed(String),
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
}
