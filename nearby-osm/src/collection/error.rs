use nearby_core::model::DiscoveryError;

#[derive(thiserror::Error, Debug)]
pub enum OverpassError {
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientError(String),
    #[error("Request to '{endpoint}' failed: {message}")]
    RequestError { endpoint: String, message: String },
    #[error("Request to '{endpoint}' timed out after {seconds}s")]
    Timeout { endpoint: String, seconds: u64 },
    #[error("Overpass responded with status {status}: {message}")]
    StatusError { status: u16, message: String },
    #[error("Failed to deserialize Overpass response: {0}")]
    DeserializeError(String),
}

impl From<OverpassError> for DiscoveryError {
    fn from(value: OverpassError) -> Self {
        match value {
            OverpassError::InvalidUserInput(msg) => DiscoveryError::InvalidUserInput(msg),
            other => DiscoveryError::CommunityQueryFailed(other.to_string()),
        }
    }
}
