use thiserror::Error;

use crate::model::ValidationError;
use crate::providers::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    User,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::User,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::User => 2,
            ErrorKind::Runtime => 1,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        Self::user(error.to_string())
    }
}

/// Device location failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("location capability unavailable")]
    Unavailable,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("location lookup failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no results for \"{0}\"")]
    NoResultsFound(String),
    #[error("search request failed: {0}")]
    RequestFailed(String),
}

impl SearchError {
    pub(crate) fn from_provider(query: &str, error: ProviderError) -> Self {
        match error {
            ProviderError::NotFound(_) => Self::NoResultsFound(query.to_string()),
            other => Self::RequestFailed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    RequestFailed(String),
}

impl From<ProviderError> for WeatherError {
    fn from(error: ProviderError) -> Self {
        Self::RequestFailed(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_exit_codes_are_stable() {
        assert_eq!(AppError::user("x").exit_code(), 2);
        assert_eq!(AppError::runtime("x").exit_code(), 1);
    }

    #[test]
    fn error_search_maps_not_found_to_no_results() {
        let error = SearchError::from_provider(
            "Atlantis",
            ProviderError::NotFound("open_meteo: Atlantis".to_string()),
        );
        assert_eq!(error, SearchError::NoResultsFound("Atlantis".to_string()));
        assert_eq!(error.to_string(), "no results for \"Atlantis\"");
    }

    #[test]
    fn error_search_maps_http_failure_to_request_failed() {
        let error = SearchError::from_provider(
            "Lisbon",
            ProviderError::Http {
                status: 503,
                message: "unavailable".to_string(),
            },
        );
        assert!(matches!(error, SearchError::RequestFailed(message) if message.contains("503")));
    }
}
