use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Display name for a location. Either a resolved locality or the
/// `"{lat:.3}, {lon:.3}"` label of its coordinate; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceName(String);

impl PlaceName {
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        Self(format!(
            "{:.3}, {:.3}",
            coordinate.latitude(),
            coordinate.longitude()
        ))
    }

    pub fn resolved(name: &str, coordinate: Coordinate) -> Self {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Self::from_coordinate(coordinate);
        }
        Self(trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub condition_code: i32,
    pub precipitation_mm: Option<f64>,
    pub uv_index_max: Option<f64>,
}

/// One provider response, normalized. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub observed_at: DateTime<FixedOffset>,
    pub timezone: String,
    pub current_temp_c: f64,
    pub feels_like_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: f64,
    pub condition_code: i32,
    pub forecast: Vec<DayForecast>,
}

impl WeatherSnapshot {
    pub fn uv_index(&self) -> Option<f64> {
        self.forecast.first().and_then(|day| day.uv_index_max)
    }
}

pub fn normalize_query(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(value.to_string())
}

pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), ValidationError> {
    if !((-90.0)..=90.0).contains(&lat) {
        return Err(ValidationError::InvalidLatitude(lat));
    }
    if !((-180.0)..=180.0).contains(&lon) {
        return Err(ValidationError::InvalidLongitude(lon));
    }
    Ok(())
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_accepts_coordinates_in_range() {
        let coordinate = Coordinate::new(52.52, 13.405).expect("coordinate");
        assert_eq!(coordinate.latitude(), 52.52);
        assert_eq!(coordinate.longitude(), 13.405);
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn model_rejects_invalid_latitude() {
        let err = Coordinate::new(100.0, 13.4).expect_err("must fail");
        assert_eq!(err, ValidationError::InvalidLatitude(100.0));
    }

    #[test]
    fn model_rejects_invalid_longitude() {
        let err = Coordinate::new(52.5, 190.0).expect_err("must fail");
        assert_eq!(err, ValidationError::InvalidLongitude(190.0));
    }

    #[test]
    fn model_rejects_nan_coordinates() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn model_place_name_falls_back_to_coordinate_label() {
        let coordinate = Coordinate::new(52.52, 13.405).expect("coordinate");

        assert_eq!(
            PlaceName::from_coordinate(coordinate).as_str(),
            "52.520, 13.405"
        );
        assert_eq!(
            PlaceName::resolved("   ", coordinate).as_str(),
            "52.520, 13.405"
        );
        assert_eq!(PlaceName::resolved(" Berlin ", coordinate).as_str(), "Berlin");
    }

    #[test]
    fn model_normalize_query_trims_input() {
        assert_eq!(normalize_query("  Lisbon ").expect("query"), "Lisbon");
        assert_eq!(
            normalize_query(" \t").expect_err("must fail"),
            ValidationError::EmptyQuery
        );
    }
}
