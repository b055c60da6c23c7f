use async_trait::async_trait;

use crate::{error::LocationError, model::Coordinates};

/// Supplies the coordinates to look weather up for.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError>;
}

/// A location known up front (CLI flags or the configured default).
/// `FixedLocation::none()` always reports the location as unavailable.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(Option<Coordinates>);

impl FixedLocation {
    pub fn new(coords: Coordinates) -> Self {
        Self(Some(coords))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        self.0.ok_or_else(|| {
            LocationError::Unavailable(
                "no location given; pass --lat/--lon or set a default location".into(),
            )
        })
    }
}
