use chrono::{DateTime, Local};
use geoweather_core::{
    WeatherSnapshot, format::country_from_locale, format_clock_time, icon_for, unit_suffix,
};

/// Country used for the temperature label: configured value, then `LC_ALL`, then `LANG`.
pub fn label_country(configured: Option<&str>) -> String {
    if let Some(c) = configured.filter(|c| !c.trim().is_empty()) {
        return c.trim().to_ascii_uppercase();
    }

    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|tag| country_from_locale(&tag))
        .unwrap_or_default()
}

/// Multi-line human-readable report of a snapshot.
pub fn snapshot(snap: &WeatherSnapshot, country: &str) -> String {
    let suffix = unit_suffix(country);
    let fetched = DateTime::from_timestamp(snap.fetched_at_unix_seconds, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let place = if snap.country_code.is_empty() {
        snap.place_name.clone()
    } else {
        format!("{}, {}", snap.place_name, snap.country_code)
    };

    [
        place,
        format!(
            "  {} ({}) [{}]",
            snap.condition_main,
            snap.condition_description,
            icon_for(&snap.icon_code).as_str()
        ),
        format!("  Temperature: {}{suffix}", snap.temp_current),
        format!("  Min / Max:   {}{suffix} / {}{suffix}", snap.temp_min, snap.temp_max),
        format!("  Humidity:    {}", snap.humidity_percent),
        format!("  Wind:        {}", snap.wind_speed),
        format!("  Sunrise:     {}", format_clock_time(snap.sunrise_unix_seconds)),
        format!("  Sunset:      {}", format_clock_time(snap.sunset_unix_seconds)),
        format!("  Fetched:     {fetched}"),
    ]
    .join("\n")
}
