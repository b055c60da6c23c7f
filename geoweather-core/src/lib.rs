//! Core library for the `geoweather` CLI.
//!
//! This crate defines:
//! - The weather lookup client (connectivity check, provider request, parsing)
//! - Last-snapshot persistence over an injected key-value store
//! - Collaborator seams for location and connectivity
//! - Display helpers (temperature label, clock time, icon category)
//! - Configuration handling
//!
//! It is used by `geoweather-cli`, but any frontend can drive `WeatherClient`.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod location;
pub mod model;
pub mod network;
pub mod openweather;
pub mod store;

pub use cache::SnapshotCache;
pub use client::{WeatherClient, client_from_config};
pub use config::{Config, DefaultLocation};
pub use error::{FetchError, LocationError, StoreError};
pub use format::{IconCategory, format_clock_time, icon_for, unit_suffix};
pub use location::{FixedLocation, LocationSource};
pub use model::{Coordinates, Units, WeatherSnapshot};
pub use network::{NetworkStatus, StaticNetworkStatus, TcpProbe};
pub use openweather::OpenWeatherApi;
pub use store::{FileStore, KeyValueStore, MemoryStore};
