use serde::Serialize;

use crate::model::{Coordinate, PlaceName};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlace {
    pub coordinate: Coordinate,
    pub place: PlaceName,
}

/// Locality fields of a reverse-geocoding answer, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseGeocode {
    pub city: Option<String>,
    pub locality: Option<String>,
    pub principal_subdivision: Option<String>,
    pub country_name: Option<String>,
}

impl ReverseGeocode {
    pub fn best_name(&self) -> Option<&str> {
        [
            &self.city,
            &self.locality,
            &self.principal_subdivision,
            &self.country_name,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .find(|value| !value.is_empty())
    }
}

pub fn search_label(name: &str, country: Option<&str>) -> String {
    let name = name.trim();
    match country.map(str::trim).filter(|value| !value.is_empty()) {
        Some(country) => format!("{name}, {country}"),
        None => name.to_string(),
    }
}
