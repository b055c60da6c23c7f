use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use geoweather_core::{
    Config, Coordinates, FetchError, FileStore, FixedLocation, NetworkStatus, StaticNetworkStatus,
    TcpProbe, Units, WeatherClient, WeatherSnapshot, cache::PREFERENCE_NAME, client_from_config,
};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Current weather for a location")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, units and default location.
    Configure,

    /// Fetch and show current weather; falls back to the last snapshot on failure.
    Show {
        /// Latitude in degrees; uses the configured default location when absent.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Unit system: metric, imperial or standard.
        #[arg(long)]
        units: Option<Units>,

        /// Skip the network and behave as if disconnected.
        #[arg(long)]
        offline: bool,
    },

    /// Show the last successfully fetched weather without touching the network.
    Cached,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, units, offline } => show(lat, lon, units, offline).await,
            Command::Cached => cached(),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        cfg.api_key = Some(api_key.trim().to_string());
    }

    let start = Units::all().iter().position(|u| *u == cfg.units).unwrap_or(0);
    cfg.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    if Confirm::new("Set a default location?")
        .with_default(cfg.default_location.is_none())
        .prompt()?
    {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Enter a number between -90 and 90")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Enter a number between -180 and 180")
            .prompt()?;

        let coords = Coordinates::new(latitude, longitude).context("Location is out of range")?;
        cfg.set_default_location(coords);
    }

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn resolve_location(
    cfg: &Config,
    lat: Option<f64>,
    lon: Option<f64>,
) -> anyhow::Result<FixedLocation> {
    if let (Some(lat), Some(lon)) = (lat, lon) {
        let coords = Coordinates::new(lat, lon).context("Location is out of range")?;
        return Ok(FixedLocation::new(coords));
    }

    match cfg.default_location {
        Some(loc) => Ok(FixedLocation::new(loc.coordinates()?)),
        None => Ok(FixedLocation::none()),
    }
}

fn open_client(cfg: &Config, offline: bool) -> anyhow::Result<WeatherClient> {
    let network: Arc<dyn NetworkStatus> = if offline {
        Arc::new(StaticNetworkStatus(false))
    } else {
        match TcpProbe::for_base_url(&cfg.base_url) {
            Some(probe) => Arc::new(probe),
            None => Arc::new(StaticNetworkStatus(true)),
        }
    };

    let data_dir = Config::data_dir()?;
    let store = FileStore::open(&data_dir, PREFERENCE_NAME)
        .with_context(|| format!("Failed to open cache in {}", data_dir.display()))?;

    client_from_config(cfg, network, Arc::new(store))
}

async fn show(
    lat: Option<f64>,
    lon: Option<f64>,
    units: Option<Units>,
    offline: bool,
) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let units = units.unwrap_or(cfg.units);
    let client = open_client(&cfg, offline)?;
    let country = render::label_country(cfg.locale_country.as_deref());

    let outcome = lookup(&cfg, &client, lat, lon, units).await;
    println!("{}", report_or_cached(outcome, &client, &country)?);
    Ok(())
}

/// Resolve location and key, then fetch. Every failure here is eligible for the
/// cached fallback.
async fn lookup(
    cfg: &Config,
    client: &WeatherClient,
    lat: Option<f64>,
    lon: Option<f64>,
    units: Units,
) -> anyhow::Result<WeatherSnapshot> {
    let location = resolve_location(cfg, lat, lon)?;
    let api_key = cfg.resolve_api_key()?;
    Ok(client.fetch_for(&location, units, &api_key).await?)
}

fn report_or_cached(
    outcome: anyhow::Result<WeatherSnapshot>,
    client: &WeatherClient,
    country: &str,
) -> anyhow::Result<String> {
    let err = match outcome {
        Ok(snap) => return Ok(render::snapshot(&snap, country)),
        Err(err) => err,
    };

    tracing::debug!(error = %err, "weather lookup failed");
    match err.downcast_ref::<FetchError>() {
        Some(fetch_err) => eprintln!("{}", fetch_err.user_message()),
        None => eprintln!("{err:#}"),
    }

    match client.last_snapshot() {
        Ok(Some(snap)) => {
            eprintln!("Showing last known weather.");
            Ok(render::snapshot(&snap, country))
        }
        Ok(None) => Err(err),
        Err(cache_err) => {
            tracing::warn!(error = %cache_err, "cached snapshot unreadable");
            Err(err)
        }
    }
}

fn cached() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let client = open_client(&cfg, true)?;
    let country = render::label_country(cfg.locale_country.as_deref());

    match client.last_snapshot()? {
        Some(snap) => println!("{}", render::snapshot(&snap, &country)),
        None => println!("No weather has been fetched yet."),
    }

    Ok(())
}
