use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::FetchError,
    model::{Coordinates, Units, WeatherSnapshot},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// HTTP access to the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherApi {
    base_url: String,
    http: Client,
}

impl OpenWeatherApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Like `new`, with a whole-request timeout applied by the HTTP client.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One GET, no retry. Non-2xx statuses are classified, bodies are parsed strictly.
    pub async fn current(
        &self,
        coords: Coordinates,
        units: Units,
        api_key: &str,
    ) -> Result<CurrentResponse, FetchError> {
        let url = format!("{}/weather", self.base_url);
        let lat = coords.latitude().to_string();
        let lon = coords.longitude().to_string();

        tracing::debug!(%url, %lat, %lon, %units, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", units.as_str()),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                body = %truncate_body(&body),
                "current weather request failed"
            );
            return Err(FetchError::from_status(status.as_u16()));
        }

        parse_current(&body)
    }
}

/// Current-weather document as the provider sends it. Fields the client does not
/// read are kept in `extra`, so the cached copy carries the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub weather: Vec<OwWeather>,
    pub main: OwMain,
    pub wind: OwWind,
    pub sys: OwSys,
    /// Empty for points with no named place, e.g. open ocean.
    #[serde(default)]
    pub name: String,
    /// Client stamp added when the response is cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwWeather {
    pub main: String,
    pub description: String,
    pub icon: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwWind {
    pub speed: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwSys {
    /// Absent outside any country.
    #[serde(default)]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn parse_current(body: &str) -> Result<CurrentResponse, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))
}

impl CurrentResponse {
    /// Normalize into a snapshot stamped with `fetched_at`. Needs at least one
    /// `weather[]` entry; the first one is the primary condition.
    pub fn to_snapshot(&self, fetched_at: i64) -> Result<WeatherSnapshot, FetchError> {
        let condition = self
            .weather
            .first()
            .ok_or_else(|| {
                FetchError::ParseError("response contained no weather entries".into())
            })?;

        Ok(WeatherSnapshot {
            condition_main: condition.main.clone(),
            condition_description: condition.description.clone(),
            icon_code: condition.icon.clone(),
            temp_current: self.main.temp,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            humidity_percent: self.main.humidity,
            wind_speed: self.wind.speed,
            sunrise_unix_seconds: self.sys.sunrise,
            sunset_unix_seconds: self.sys.sunset,
            country_code: self.sys.country.clone(),
            place_name: self.name.clone(),
            fetched_at_unix_seconds: fetched_at,
        })
    }
}

/// Minimal provider document carrying exactly what a snapshot holds.
impl From<&WeatherSnapshot> for CurrentResponse {
    fn from(s: &WeatherSnapshot) -> Self {
        CurrentResponse {
            weather: vec![OwWeather {
                main: s.condition_main.clone(),
                description: s.condition_description.clone(),
                icon: s.icon_code.clone(),
                extra: Map::new(),
            }],
            main: OwMain {
                temp: s.temp_current,
                temp_min: s.temp_min,
                temp_max: s.temp_max,
                humidity: s.humidity_percent,
                extra: Map::new(),
            },
            wind: OwWind {
                speed: s.wind_speed,
                extra: Map::new(),
            },
            sys: OwSys {
                country: s.country_code.clone(),
                sunrise: s.sunrise_unix_seconds,
                sunset: s.sunset_unix_seconds,
                extra: Map::new(),
            },
            name: s.place_name.clone(),
            fetched_at: Some(s.fetched_at_unix_seconds),
            extra: Map::new(),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
