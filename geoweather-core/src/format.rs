//! Display helpers for a rendered snapshot.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Countries whose locale shows the Fahrenheit label.
const FAHRENHEIT_COUNTRIES: &[&str] = &["US", "LR", "MM"];

/// Temperature label for a locale's country code.
///
/// Only the label changes. The value shown next to it is still whatever unit
/// system was requested from the provider, so a `US` locale with metric data
/// shows Celsius numbers labelled `°F`.
pub fn unit_suffix(country_code: &str) -> &'static str {
    if FAHRENHEIT_COUNTRIES.contains(&country_code) {
        "°F"
    } else {
        "°C"
    }
}

/// Extract the region from a locale tag such as `en_US.UTF-8`, `en-US` or `[en_US]`.
pub fn country_from_locale(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('[').trim_end_matches(']');
    let tag = tag.split(['.', '@', ',']).next()?;

    let region = tag.split(['_', '-']).nth(1)?;
    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}

/// `HH:MM` in the local time zone.
pub fn format_clock_time(unix_seconds: i64) -> String {
    format_clock_time_in(unix_seconds, &Local)
}

/// `HH:MM` in the given time zone. Out-of-range timestamps render as `--:--`.
pub fn format_clock_time_in<Tz: TimeZone>(unix_seconds: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(unix_seconds, 0) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// Icon families a renderer needs to pick artwork for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconCategory {
    #[default]
    Clear,
    Cloud,
    Rain,
    Storm,
    Snow,
}

impl IconCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloud => "cloud",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snow => "snow",
        }
    }
}

/// Classify a provider icon code (`01d`, `10n`, ...). Unknown codes are `Clear`.
pub fn icon_for(code: &str) -> IconCategory {
    let code = code.strip_suffix(".png").unwrap_or(code);

    let Some((group, variant)) = code.split_at_checked(2) else {
        return IconCategory::Clear;
    };
    if variant != "d" && variant != "n" {
        return IconCategory::Clear;
    }

    match group {
        "01" => IconCategory::Clear,
        "02" | "03" | "04" | "09" => IconCategory::Cloud,
        "10" => IconCategory::Rain,
        "11" => IconCategory::Storm,
        "13" => IconCategory::Snow,
        _ => IconCategory::Clear,
    }
}
