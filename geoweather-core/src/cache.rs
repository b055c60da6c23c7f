//! Last-known-good snapshot, persisted in the provider's response schema.

use std::sync::Arc;

use crate::{
    error::{FetchError, StoreError},
    model::WeatherSnapshot,
    openweather::{CurrentResponse, parse_current},
    store::KeyValueStore,
};

/// Preference document the snapshot lives in.
pub const PREFERENCE_NAME: &str = "WeatherAppPreference";

/// Key of the snapshot inside the preference document.
pub const WEATHER_RESPONSE_DATA: &str = "weather_response_data";

#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache").finish_non_exhaustive()
    }
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Serialize a snapshot to the cached document format. Used when no provider
    /// response is at hand; `save` keeps the full response instead.
    pub fn encode(snapshot: &WeatherSnapshot) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&CurrentResponse::from(snapshot))?)
    }

    /// Parse a cached document. Documents without `fetched_at` read back as 0.
    pub fn decode(raw: &str) -> Result<WeatherSnapshot, FetchError> {
        let doc = parse_current(raw)?;
        doc.to_snapshot(doc.fetched_at.unwrap_or_default())
    }

    /// A store failure is `FetchError::Store`; an unparseable document is
    /// `FetchError::ParseError`.
    pub fn load(&self) -> Result<Option<WeatherSnapshot>, FetchError> {
        let raw = self.store.get(WEATHER_RESPONSE_DATA)?;
        raw.as_deref().map(Self::decode).transpose()
    }

    /// Overwrite the stored document with the provider response as received,
    /// stamped with `fetched_at`.
    pub fn save(&self, response: &CurrentResponse, fetched_at: i64) -> Result<(), StoreError> {
        let mut doc = response.clone();
        doc.fetched_at = Some(fetched_at);

        let raw = serde_json::to_string(&doc)?;
        self.store.put(WEATHER_RESPONSE_DATA, &raw)
    }

    /// Raw stored document, exactly as written.
    pub fn raw(&self) -> Result<Option<String>, StoreError> {
        self.store.get(WEATHER_RESPONSE_DATA)
    }
}
