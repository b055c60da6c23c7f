use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    model::{Coordinates, Units},
    openweather::DEFAULT_BASE_URL,
};

/// Overrides the stored API key when set.
pub const API_KEY_ENV: &str = "GEOWEATHER_API_KEY";

/// A saved location, validated when turned into `Coordinates`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl DefaultLocation {
    pub fn coordinates(&self) -> Result<Coordinates> {
        Coordinates::new(self.latitude, self.longitude)
            .context("Configured default location is out of range")
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
///
/// [default_location]
/// latitude = 48.8566
/// longitude = 2.3522
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Units,
    pub base_url: String,
    /// Two-letter country used to pick the temperature label; falls back to the
    /// process locale when absent.
    pub locale_country: Option<String>,
    /// Whole-request timeout; the HTTP client default applies when absent.
    pub request_timeout_secs: Option<u64>,
    pub default_location: Option<DefaultLocation>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            locale_country: None,
            request_timeout_secs: None,
            default_location: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "geoweather", "geoweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding the cached snapshot.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// API key from the environment, then from the file.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_with(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `geoweather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn set_default_location(&mut self, coords: Coordinates) {
        self.default_location = Some(DefaultLocation {
            latitude: coords.latitude(),
            longitude: coords.longitude(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(cfg.request_timeout(), None);
        assert!(cfg.default_location.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml("api_key = \"K\"\nunits = \"imperial\"\n").unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("K"));
        assert_eq!(cfg.units, Units::Imperial);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = Config {
            api_key: Some("OPEN_KEY".into()),
            request_timeout_secs: Some(15),
            locale_country: Some("US".into()),
            ..Config::default()
        };
        cfg.set_default_location(Coordinates::new(40.7, -74.0).unwrap());

        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn invalid_units_are_rejected() {
        assert!(Config::from_toml("units = \"furlongs\"").is_err());
    }

    #[test]
    fn out_of_range_default_location_errors() {
        let cfg =
            Config::from_toml("[default_location]\nlatitude = 91.0\nlongitude = 0.0\n").unwrap();
        let err = cfg.default_location.unwrap().coordinates().unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn api_key_resolution_order() {
        let cfg = Config {
            api_key: Some("FILE".into()),
            ..Config::default()
        };
        assert_eq!(cfg.resolve_api_key_with(Some("ENV".into())).unwrap(), "ENV");
        assert_eq!(cfg.resolve_api_key_with(Some("  ".into())).unwrap(), "FILE");
        assert_eq!(cfg.resolve_api_key_with(None).unwrap(), "FILE");
    }

    #[test]
    fn missing_api_key_has_hint() {
        let err = Config::default().resolve_api_key_with(None).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("geoweather configure"));
    }
}
