use std::collections::HashMap;
use std::time::Duration;

use crate::model::Coordinate;

pub const LOCATION_TIMEOUT_MS: u64 = 10_000;
pub const LOCATION_MAX_AGE_MS: u64 = 60_000;

pub const LOCATION_SOURCE_ENV: &str = "WEATHER_NOW_LOCATION";
pub const LOCATION_TIMEOUT_MS_ENV: &str = "WEATHER_NOW_LOCATION_TIMEOUT_MS";
pub const LOCATION_MAX_AGE_MS_ENV: &str = "WEATHER_NOW_LOCATION_MAX_AGE_MS";
pub const LOG_FILTER_ENV: &str = "WEATHER_NOW_LOG";

pub const USER_AGENT: &str = concat!("weather-now/", env!("CARGO_PKG_VERSION"));

/// Where device fixes come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationSource {
    Ip,
    Fixed(Coordinate),
    Denied,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub location_source: LocationSource,
    pub location_timeout: Duration,
    pub location_max_age: Duration,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub(crate) fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            location_source: resolve_location_source(&map),
            location_timeout: resolve_millis(&map, LOCATION_TIMEOUT_MS_ENV, LOCATION_TIMEOUT_MS),
            location_max_age: resolve_millis(&map, LOCATION_MAX_AGE_MS_ENV, LOCATION_MAX_AGE_MS),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_pairs(Vec::<(String, String)>::new())
    }
}

fn resolve_location_source(env_map: &HashMap<String, String>) -> LocationSource {
    let Some(raw) = env_map
        .get(LOCATION_SOURCE_ENV)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        return LocationSource::Ip;
    };

    match raw.to_ascii_lowercase().as_str() {
        "ip" | "auto" => LocationSource::Ip,
        "off" | "deny" | "denied" => LocationSource::Denied,
        "none" => LocationSource::Unavailable,
        _ => parse_fixed_coordinate(raw)
            .map(LocationSource::Fixed)
            .unwrap_or(LocationSource::Unavailable),
    }
}

fn parse_fixed_coordinate(raw: &str) -> Option<Coordinate> {
    let (lat, lon) = raw.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lon).ok()
}

fn resolve_millis(env_map: &HashMap<String, String>, key: &str, default_ms: u64) -> Duration {
    let millis = env_map
        .get(key)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_ms);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_use_ip_location_and_standard_limits() {
        let config = RuntimeConfig::default();
        assert_eq!(config.location_source, LocationSource::Ip);
        assert_eq!(config.location_timeout, Duration::from_millis(10_000));
        assert_eq!(config.location_max_age, Duration::from_millis(60_000));
    }

    #[test]
    fn config_parses_fixed_coordinate() {
        let config = RuntimeConfig::from_pairs(vec![(LOCATION_SOURCE_ENV, " 52.52 , 13.405 ")]);
        let expected = Coordinate::new(52.52, 13.405).expect("coordinate");
        assert_eq!(config.location_source, LocationSource::Fixed(expected));
    }

    #[test]
    fn config_maps_off_to_denied_and_garbage_to_unavailable() {
        let denied = RuntimeConfig::from_pairs(vec![(LOCATION_SOURCE_ENV, "OFF")]);
        assert_eq!(denied.location_source, LocationSource::Denied);

        let garbage = RuntimeConfig::from_pairs(vec![(LOCATION_SOURCE_ENV, "95,200")]);
        assert_eq!(garbage.location_source, LocationSource::Unavailable);
    }

    #[test]
    fn config_supports_location_limit_overrides() {
        let config = RuntimeConfig::from_pairs(vec![
            (LOCATION_TIMEOUT_MS_ENV, "2500"),
            (LOCATION_MAX_AGE_MS_ENV, "0"),
        ]);

        assert_eq!(config.location_timeout, Duration::from_millis(2_500));
        assert_eq!(config.location_max_age, Duration::from_millis(60_000));
    }

    #[test]
    fn config_falls_back_when_timeout_override_invalid() {
        let config = RuntimeConfig::from_pairs(vec![(LOCATION_TIMEOUT_MS_ENV, "soon")]);
        assert_eq!(config.location_timeout, Duration::from_millis(10_000));
    }
}
