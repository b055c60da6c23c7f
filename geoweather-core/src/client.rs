use std::sync::Arc;

use chrono::Utc;

use crate::{
    Config,
    cache::SnapshotCache,
    error::FetchError,
    location::LocationSource,
    model::{Coordinates, Units, WeatherSnapshot},
    network::NetworkStatus,
    openweather::OpenWeatherApi,
    store::KeyValueStore,
};

/// Fetches current weather for coordinates and keeps the last good snapshot.
///
/// Callers must not run overlapping fetches against the same store; the client
/// does no de-duplication. Dropping a `fetch` future before it completes leaves
/// the cache as it was.
#[derive(Clone)]
pub struct WeatherClient {
    api: OpenWeatherApi,
    network: Arc<dyn NetworkStatus>,
    cache: SnapshotCache,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    pub fn new(
        api: OpenWeatherApi,
        network: Arc<dyn NetworkStatus>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            api,
            network,
            cache: SnapshotCache::new(store),
        }
    }

    pub async fn fetch(
        &self,
        coords: Coordinates,
        units: Units,
        api_key: &str,
    ) -> Result<WeatherSnapshot, FetchError> {
        if !self.network.is_available().await {
            tracing::info!("network unavailable, skipping weather request");
            return Err(FetchError::NoConnectivity);
        }

        let response = self.api.current(coords, units, api_key).await?;
        let fetched_at = Utc::now().timestamp();
        let snapshot = response.to_snapshot(fetched_at)?;

        // A failed write keeps the previous snapshot; the fresh one is still returned.
        if let Err(e) = self.cache.save(&response, fetched_at) {
            tracing::warn!(error = %e, "failed to persist weather snapshot");
        }

        tracing::info!(
            place = %snapshot.place_name,
            country = %snapshot.country_code,
            condition = %snapshot.condition_main,
            "fetched current weather"
        );

        Ok(snapshot)
    }

    /// Ask `source` for coordinates, then fetch. Location failures come back as
    /// `FetchError::LocationUnavailable`.
    pub async fn fetch_for(
        &self,
        source: &dyn LocationSource,
        units: Units,
        api_key: &str,
    ) -> Result<WeatherSnapshot, FetchError> {
        let coords = source.current_coordinates().await?;
        tracing::debug!(%coords, "location resolved");
        self.fetch(coords, units, api_key).await
    }

    /// The last successfully fetched snapshot, if any.
    pub fn last_snapshot(&self) -> Result<Option<WeatherSnapshot>, FetchError> {
        self.cache.load()
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}

/// Build a client for the configured provider endpoint and timeout.
pub fn client_from_config(
    config: &Config,
    network: Arc<dyn NetworkStatus>,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<WeatherClient> {
    let api = match config.request_timeout() {
        Some(timeout) => OpenWeatherApi::with_timeout(&config.base_url, timeout)?,
        None => OpenWeatherApi::new(&config.base_url),
    };

    Ok(WeatherClient::new(api, network, store))
}
