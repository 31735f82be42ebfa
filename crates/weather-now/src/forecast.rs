use tracing::{debug, info};

use crate::error::WeatherError;
use crate::model::{Coordinate, WeatherSnapshot};
use crate::providers::ProviderApi;

pub fn fetch<P: ProviderApi>(
    providers: &P,
    coordinate: Coordinate,
) -> Result<WeatherSnapshot, WeatherError> {
    debug!(
        latitude = coordinate.latitude(),
        longitude = coordinate.longitude(),
        "requesting forecast"
    );

    let snapshot = providers.fetch_forecast(coordinate)?;

    info!(
        observed_at = %snapshot.observed_at,
        days = snapshot.forecast.len(),
        "forecast loaded"
    );
    Ok(snapshot)
}
