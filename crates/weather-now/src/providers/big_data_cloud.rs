use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::geocoding::ReverseGeocode;
use crate::model::Coordinate;

use super::{ProviderError, execute_request};

pub(crate) const PROVIDER_NAME: &str = "big_data_cloud";
const REVERSE_ENDPOINT: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReverseQuery<'a> {
    latitude: f64,
    longitude: f64,
    locality_language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseResponse {
    city: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
    country_name: Option<String>,
}

pub fn fetch_reverse_geocode(
    client: &Client,
    coordinate: Coordinate,
) -> Result<ReverseGeocode, ProviderError> {
    let params = ReverseQuery {
        latitude: coordinate.latitude(),
        longitude: coordinate.longitude(),
        locality_language: "en",
    };

    let body = execute_request(client.get(REVERSE_ENDPOINT).query(&params))?;
    parse_reverse_response(&body)
}

fn parse_reverse_response(body: &str) -> Result<ReverseGeocode, ProviderError> {
    let payload: ReverseResponse = serde_json::from_str(body)
        .map_err(|error| ProviderError::InvalidResponse(format!("reverse payload: {error}")))?;

    Ok(ReverseGeocode {
        city: payload.city,
        locality: payload.locality,
        principal_subdivision: payload.principal_subdivision,
        country_name: payload.country_name,
    })
}
