//! Device location sources.
//!
//! A terminal has no platform geolocation API, so the "device" fix is either
//! derived from the public IP address or pinned through configuration.
//! Implementations must honor `LocationOptions::timeout`; callers also
//! discard fixes that arrive late.

use std::cell::Cell;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{LocationSource, RuntimeConfig};
use crate::error::LocationError;
use crate::model::Coordinate;

const IP_LOOKUP_ENDPOINT: &str = "https://ipapi.co/json/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub max_age: Duration,
}

impl LocationOptions {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            high_accuracy: true,
            timeout: config.location_timeout,
            max_age: config.location_max_age,
        }
    }
}

pub trait DeviceLocator {
    fn locate(&self, options: &LocationOptions) -> Result<Coordinate, LocationError>;
}

/// Approximate fix from the caller's public IP address. `high_accuracy` has
/// no effect on this source.
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpLocator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DeviceLocator for IpLocator {
    fn locate(&self, options: &LocationOptions) -> Result<Coordinate, LocationError> {
        let response = self
            .client
            .get(IP_LOOKUP_ENDPOINT)
            .timeout(options.timeout)
            .send()
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().map_err(transport_error)?;

        if !status.is_success() {
            return Err(LocationError::Failed(format!(
                "ip lookup returned http {}",
                status.as_u16()
            )));
        }

        parse_ip_lookup(&body)
    }
}

fn transport_error(error: reqwest::Error) -> LocationError {
    if error.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::Failed(error.to_string())
    }
}

fn parse_ip_lookup(body: &str) -> Result<Coordinate, LocationError> {
    let payload: IpLookupResponse = serde_json::from_str(body)
        .map_err(|error| LocationError::Failed(format!("ip lookup payload: {error}")))?;

    if payload.error {
        let reason = payload.reason.unwrap_or_else(|| "unknown".to_string());
        return Err(LocationError::Failed(format!("ip lookup refused: {reason}")));
    }

    match (payload.latitude, payload.longitude) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
            .map_err(|error| LocationError::Failed(format!("ip lookup payload: {error}"))),
        _ => Err(LocationError::Failed(
            "ip lookup payload: missing coordinates".to_string(),
        )),
    }
}

/// The locator selected by `WEATHER_NOW_LOCATION`.
#[derive(Debug, Clone)]
pub enum SystemLocator {
    Ip(IpLocator),
    Fixed(Coordinate),
    Denied,
    Unavailable,
}

impl SystemLocator {
    pub fn from_config(config: &RuntimeConfig, client: Client) -> Self {
        match config.location_source {
            LocationSource::Ip => Self::Ip(IpLocator::new(client)),
            LocationSource::Fixed(coordinate) => Self::Fixed(coordinate),
            LocationSource::Denied => Self::Denied,
            LocationSource::Unavailable => Self::Unavailable,
        }
    }
}

impl DeviceLocator for SystemLocator {
    fn locate(&self, options: &LocationOptions) -> Result<Coordinate, LocationError> {
        match self {
            Self::Ip(locator) => locator.locate(options),
            Self::Fixed(coordinate) => Ok(*coordinate),
            Self::Denied => Err(LocationError::PermissionDenied),
            Self::Unavailable => Err(LocationError::Unavailable),
        }
    }
}

/// Reuses the last successful fix while it is no older than `max_age`.
pub struct CachedLocator<L, N = fn() -> Instant> {
    inner: L,
    clock: N,
    last_fix: Cell<Option<(Instant, Coordinate)>>,
}

impl<L> CachedLocator<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            clock: Instant::now,
            last_fix: Cell::new(None),
        }
    }
}

impl<L, N> CachedLocator<L, N>
where
    N: Fn() -> Instant,
{
    pub fn with_clock(inner: L, clock: N) -> Self {
        Self {
            inner,
            clock,
            last_fix: Cell::new(None),
        }
    }
}

impl<L, N> DeviceLocator for CachedLocator<L, N>
where
    L: DeviceLocator,
    N: Fn() -> Instant,
{
    fn locate(&self, options: &LocationOptions) -> Result<Coordinate, LocationError> {
        if let Some((fixed_at, coordinate)) = self.last_fix.get() {
            let age = (self.clock)().saturating_duration_since(fixed_at);
            if age <= options.max_age {
                debug!(age_ms = age.as_millis() as u64, "reusing cached location fix");
                return Ok(coordinate);
            }
        }

        let coordinate = self.inner.locate(options)?;
        self.last_fix.set(Some(((self.clock)(), coordinate)));
        Ok(coordinate)
    }
}
