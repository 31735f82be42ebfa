use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::geocoding::{ResolvedPlace, search_label};
use crate::model::{Coordinate, DayForecast, PlaceName, WeatherSnapshot};

use super::{ProviderError, execute_request};

pub(crate) const PROVIDER_NAME: &str = "open_meteo";
const SEARCH_ENDPOINT: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
const FORECAST_HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation_probability,weathercode";
const FORECAST_DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,uv_index_max,weathercode";

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    name: &'a str,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    current_weather: bool,
    hourly: &'a str,
    daily: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    current_weather: Option<CurrentWeather>,
    hourly: Option<ForecastHourly>,
    daily: Option<ForecastDaily>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    time: String,
    temperature: f64,
    windspeed: f64,
    weathercode: i32,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ForecastDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<i32>,
}

pub fn fetch_place(client: &Client, query: &str) -> Result<ResolvedPlace, ProviderError> {
    let params = SearchQuery {
        name: query,
        count: 1,
        language: "en",
        format: "json",
    };

    let body = execute_request(client.get(SEARCH_ENDPOINT).query(&params))?;
    parse_search_response(&body, query)
}

pub fn fetch_forecast(
    client: &Client,
    coordinate: Coordinate,
) -> Result<WeatherSnapshot, ProviderError> {
    let params = ForecastQuery {
        latitude: coordinate.latitude(),
        longitude: coordinate.longitude(),
        current_weather: true,
        hourly: FORECAST_HOURLY_FIELDS,
        daily: FORECAST_DAILY_FIELDS,
        timezone: "auto",
    };

    let body = execute_request(client.get(FORECAST_ENDPOINT).query(&params))?;
    parse_forecast_response(&body)
}

fn parse_search_response(body: &str, query: &str) -> Result<ResolvedPlace, ProviderError> {
    let payload: SearchResponse = serde_json::from_str(body)
        .map_err(|error| ProviderError::InvalidResponse(format!("search payload: {error}")))?;

    let Some(result) = payload.results.into_iter().next() else {
        return Err(ProviderError::NotFound(query.to_string()));
    };

    if result.name.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(
            "search payload: empty location name".to_string(),
        ));
    }

    let coordinate = Coordinate::new(result.latitude, result.longitude)
        .map_err(|error| ProviderError::InvalidResponse(format!("search payload: {error}")))?;
    let label = search_label(&result.name, result.country.as_deref());

    Ok(ResolvedPlace {
        coordinate,
        place: PlaceName::resolved(&label, coordinate),
    })
}

fn parse_forecast_response(body: &str) -> Result<WeatherSnapshot, ProviderError> {
    let payload: ForecastResponse = serde_json::from_str(body)
        .map_err(|error| ProviderError::InvalidResponse(format!("forecast payload: {error}")))?;

    let current = payload.current_weather.ok_or_else(|| {
        ProviderError::InvalidResponse("forecast payload: missing current_weather".to_string())
    })?;
    let daily = payload
        .daily
        .ok_or_else(|| ProviderError::InvalidResponse("forecast payload: missing daily".into()))?;
    let hourly = payload.hourly.unwrap_or_default();

    let observed_at = parse_local_timestamp(&current.time, payload.utc_offset_seconds)?;

    // Exact timestamp match only; no interpolation between hours.
    let hourly_index = hourly.time.iter().position(|time| *time == current.time);
    let feels_like_c = hourly_index
        .and_then(|index| hourly.apparent_temperature.get(index).copied().flatten())
        .unwrap_or(current.temperature);
    let humidity_pct =
        hourly_index.and_then(|index| hourly.relative_humidity_2m.get(index).copied().flatten());

    Ok(WeatherSnapshot {
        observed_at,
        timezone: payload
            .timezone
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "UTC".to_string()),
        current_temp_c: current.temperature,
        feels_like_c: Some(feels_like_c),
        humidity_pct,
        wind_speed_kmh: current.windspeed,
        condition_code: current.weathercode,
        forecast: build_forecast_days(daily)?,
    })
}

fn build_forecast_days(daily: ForecastDaily) -> Result<Vec<DayForecast>, ProviderError> {
    let length = daily.time.len();

    if daily.temperature_2m_max.len() != length
        || daily.temperature_2m_min.len() != length
        || daily.precipitation_sum.len() != length
        || daily.uv_index_max.len() != length
        || daily.weathercode.len() != length
    {
        return Err(ProviderError::InvalidResponse(
            "forecast payload: daily arrays length mismatch".to_string(),
        ));
    }

    let mut days = Vec::with_capacity(length);
    for index in 0..length {
        let raw_date = daily.time[index].trim();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|error| {
            ProviderError::InvalidResponse(format!(
                "forecast payload: bad date '{raw_date}' in daily.time: {error}"
            ))
        })?;

        days.push(DayForecast {
            date,
            max_temp_c: daily.temperature_2m_max[index],
            min_temp_c: daily.temperature_2m_min[index],
            condition_code: daily.weathercode[index],
            precipitation_mm: daily.precipitation_sum[index],
            uv_index_max: daily.uv_index_max[index],
        });
    }

    Ok(days)
}

fn parse_local_timestamp(
    raw: &str,
    utc_offset_seconds: i32,
) -> Result<DateTime<FixedOffset>, ProviderError> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|error| {
            ProviderError::InvalidResponse(format!(
                "forecast payload: bad current_weather.time '{raw}': {error}"
            ))
        })?;
    let offset = FixedOffset::east_opt(utc_offset_seconds).ok_or_else(|| {
        ProviderError::InvalidResponse(format!(
            "forecast payload: utc offset out of range: {utc_offset_seconds}"
        ))
    })?;

    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| ProviderError::InvalidResponse(format!("ambiguous local time '{raw}'")))
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    const BERLIN_FORECAST: &str = r#"{
        "latitude": 52.52,
        "longitude": 13.419998,
        "timezone": "Europe/Berlin",
        "utc_offset_seconds": 3600,
        "current_weather": {
            "time": "2026-01-06T14:00",
            "temperature": 3.4,
            "windspeed": 14.8,
            "winddirection": 250,
            "weathercode": 3
        },
        "hourly": {
            "time": ["2026-01-06T13:00", "2026-01-06T14:00", "2026-01-06T15:00"],
            "temperature_2m": [3.1, 3.4, 3.2],
            "relative_humidity_2m": [80, 78, 81],
            "apparent_temperature": [-0.4, -0.9, -1.1],
            "precipitation_probability": [10, 5, 5],
            "weathercode": [3, 3, 2]
        },
        "daily": {
            "time": ["2026-01-06", "2026-01-07"],
            "temperature_2m_max": [4.2, 2.0],
            "temperature_2m_min": [-1.5, -3.8],
            "precipitation_sum": [0.3, null],
            "uv_index_max": [0.85, null],
            "weathercode": [3, 71]
        }
    }"#;

    #[test]
    fn open_meteo_search_parses_first_result() {
        let body = r#"{
            "results": [
                {"name": "Lisbon", "country": "Portugal", "latitude": 38.71667, "longitude": -9.13333},
                {"name": "Lisbon", "country": "United States", "latitude": 41.63, "longitude": -91.73}
            ],
            "generationtime_ms": 0.9
        }"#;

        let place = parse_search_response(body, "Lisbon").expect("place");
        assert_eq!(place.place.as_str(), "Lisbon, Portugal");
        assert_eq!(place.coordinate.latitude(), 38.71667);
        assert_eq!(place.coordinate.longitude(), -9.13333);
    }

    #[test]
    fn open_meteo_search_returns_not_found_without_results() {
        let error = parse_search_response(r#"{"generationtime_ms": 0.4}"#, "Nowhere")
            .expect_err("must fail");
        assert_eq!(error, ProviderError::NotFound("Nowhere".to_string()));

        let error = parse_search_response(r#"{"results": []}"#, "Nowhere").expect_err("must fail");
        assert_eq!(error, ProviderError::NotFound("Nowhere".to_string()));
    }

    #[test]
    fn open_meteo_search_rejects_out_of_range_coordinates() {
        let body = r#"{"results": [{"name": "Bad", "latitude": 91.0, "longitude": 0.0}]}"#;
        let error = parse_search_response(body, "Bad").expect_err("must fail");
        assert!(matches!(error, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn open_meteo_forecast_reads_feels_like_at_matching_hour() {
        let snapshot = parse_forecast_response(BERLIN_FORECAST).expect("snapshot");

        assert_eq!(snapshot.timezone, "Europe/Berlin");
        assert_eq!(snapshot.current_temp_c, 3.4);
        assert_eq!(snapshot.feels_like_c, Some(-0.9));
        assert_eq!(snapshot.humidity_pct, Some(78.0));
        assert_eq!(snapshot.wind_speed_kmh, 14.8);
        assert_eq!(snapshot.condition_code, 3);
        assert_eq!(snapshot.observed_at.hour(), 14);
        assert_eq!(snapshot.observed_at.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn open_meteo_forecast_falls_back_without_exact_hour() {
        let body = BERLIN_FORECAST.replace("\"time\": \"2026-01-06T14:00\"", "\"time\": \"2026-01-06T14:15\"");
        let snapshot = parse_forecast_response(&body).expect("snapshot");

        assert_eq!(snapshot.feels_like_c, Some(3.4));
        assert_eq!(snapshot.humidity_pct, None);
        assert_eq!(snapshot.observed_at.minute(), 15);
    }

    #[test]
    fn open_meteo_forecast_zips_daily_arrays_and_keeps_null_precipitation() {
        let snapshot = parse_forecast_response(BERLIN_FORECAST).expect("snapshot");

        assert_eq!(snapshot.forecast.len(), 2);
        let first = &snapshot.forecast[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 1, 6).expect("date"));
        assert_eq!(first.max_temp_c, 4.2);
        assert_eq!(first.min_temp_c, -1.5);
        assert_eq!(first.precipitation_mm, Some(0.3));
        assert_eq!(snapshot.uv_index(), Some(0.85));

        let second = &snapshot.forecast[1];
        assert_eq!(second.condition_code, 71);
        assert_eq!(second.precipitation_mm, None);
        assert_eq!(second.uv_index_max, None);
    }

    #[test]
    fn open_meteo_forecast_rejects_mismatched_daily_lengths() {
        let body = BERLIN_FORECAST.replace("\"weathercode\": [3, 71]", "\"weathercode\": [3]");
        let error = parse_forecast_response(&body).expect_err("must fail");

        assert!(
            matches!(error, ProviderError::InvalidResponse(message) if message.contains("length mismatch"))
        );
    }

    #[test]
    fn open_meteo_forecast_requires_current_weather() {
        let body = r#"{"timezone": "UTC", "daily": {"time": []}}"#;
        let error = parse_forecast_response(body).expect_err("must fail");

        assert!(
            matches!(error, ProviderError::InvalidResponse(message) if message.contains("current_weather"))
        );
    }
}
