use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use thiserror::Error;

use crate::config::USER_AGENT;
use crate::geocoding::{ResolvedPlace, ReverseGeocode};
use crate::model::{Coordinate, WeatherSnapshot};

pub mod big_data_cloud;
pub mod open_meteo;

/// Remote services behind the pipeline. One attempt per call, no retry.
pub trait ProviderApi {
    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<ReverseGeocode, ProviderError>;
    fn search_place(&self, query: &str) -> Result<ResolvedPlace, ProviderError>;
    fn fetch_forecast(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, ProviderError>;
}

impl<T: ProviderApi + ?Sized> ProviderApi for &T {
    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<ReverseGeocode, ProviderError> {
        (**self).reverse_geocode(coordinate)
    }

    fn search_place(&self, query: &str) -> Result<ResolvedPlace, ProviderError> {
        (**self).search_place(query)
    }

    fn fetch_forecast(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, ProviderError> {
        (**self).fetch_forecast(coordinate)
    }
}

#[derive(Debug, Clone)]
pub struct HttpProviders {
    client: Client,
}

impl HttpProviders {
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl ProviderApi for HttpProviders {
    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<ReverseGeocode, ProviderError> {
        big_data_cloud::fetch_reverse_geocode(&self.client, coordinate)
            .map_err(|error| error.with_provider(big_data_cloud::PROVIDER_NAME))
    }

    fn search_place(&self, query: &str) -> Result<ResolvedPlace, ProviderError> {
        open_meteo::fetch_place(&self.client, query)
            .map_err(|error| error.with_provider(open_meteo::PROVIDER_NAME))
    }

    fn fetch_forecast(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, ProviderError> {
        open_meteo::fetch_forecast(&self.client, coordinate)
            .map_err(|error| error.with_provider(open_meteo::PROVIDER_NAME))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("location not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    pub fn with_provider(self, provider: &'static str) -> Self {
        match self {
            ProviderError::Transport(message) => {
                ProviderError::Transport(format!("{provider}: {message}"))
            }
            ProviderError::Http { status, message } => ProviderError::Http {
                status,
                message: format!("{provider}: {message}"),
            },
            ProviderError::InvalidResponse(message) => {
                ProviderError::InvalidResponse(format!("{provider}: {message}"))
            }
            ProviderError::NotFound(message) => {
                ProviderError::NotFound(format!("{provider}: {message}"))
            }
        }
    }
}

pub(crate) fn execute_request(request: RequestBuilder) -> Result<String, ProviderError> {
    let response = request
        .send()
        .map_err(|error| ProviderError::Transport(error.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|error| ProviderError::Transport(error.to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    let message = extract_error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    Err(ProviderError::Http {
        status: status.as_u16(),
        message,
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|json| {
            ["reason", "message", "error", "detail", "description"]
                .into_iter()
                .filter_map(|key| json.get(key).and_then(Value::as_str))
                .map(str::trim)
                .find(|message| !message.is_empty())
                .map(str::to_string)
        });

    from_json.or_else(|| Some(trimmed.to_string()))
}
