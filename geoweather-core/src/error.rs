use thiserror::Error;

/// Terminal outcome of a single lookup attempt. Nothing here is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("no network connectivity")]
    NoConnectivity,

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("provider rejected the request (400)")]
    BadRequest,

    #[error("provider returned 404 for the requested location")]
    NotFound,

    #[error("provider returned status {0}")]
    ProviderError(u16),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    ParseError(String),

    /// The snapshot store could not be read.
    #[error("snapshot store unavailable: {0}")]
    Store(String),
}

impl FetchError {
    /// Map a non-2xx HTTP status to its error class.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            other => Self::ProviderError(other),
        }
    }

    /// Short text suitable for showing to a person.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoConnectivity => "No Internet Connection".to_string(),
            Self::LocationUnavailable(_) => "Location is not available".to_string(),
            Self::InvalidCoordinates { .. } => "Invalid location".to_string(),
            Self::BadRequest => "Bad Connection".to_string(),
            Self::NotFound => "Response Not Found".to_string(),
            Self::ProviderError(_) => "Generic Error".to_string(),
            Self::Transport(msg) => format!("Network error: {msg}"),
            Self::ParseError(_) => "Unexpected response from weather service".to_string(),
            Self::Store(_) => "Local cache error".to_string(),
        }
    }
}

/// Failure reported by a location collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for FetchError {
    fn from(err: StoreError) -> Self {
        FetchError::Store(err.to_string())
    }
}

impl From<LocationError> for FetchError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::Unavailable(msg) => FetchError::LocationUnavailable(msg),
        }
    }
}

/// Failure of the key-value persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
