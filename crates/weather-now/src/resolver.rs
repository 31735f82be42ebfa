use std::time::Instant;

use tracing::{debug, info};

use crate::error::{LocationError, SearchError};
use crate::geocoding::ResolvedPlace;
use crate::locator::{DeviceLocator, LocationOptions};
use crate::model::{Coordinate, PlaceName};
use crate::providers::ProviderApi;

pub fn acquire_device_location<L: DeviceLocator>(
    locator: &L,
    options: &LocationOptions,
) -> Result<Coordinate, LocationError> {
    let started = Instant::now();
    let coordinate = locator.locate(options)?;

    // The caller's timeout wins even over a source that ignored it.
    if started.elapsed() > options.timeout {
        debug!(
            timeout_ms = options.timeout.as_millis() as u64,
            "discarding late location fix"
        );
        return Err(LocationError::Timeout);
    }

    info!(
        latitude = coordinate.latitude(),
        longitude = coordinate.longitude(),
        "device location acquired"
    );
    Ok(coordinate)
}

/// Never fails: any lookup problem degrades to the coordinate label.
pub fn reverse_lookup<P: ProviderApi>(providers: &P, coordinate: Coordinate) -> PlaceName {
    match providers.reverse_geocode(coordinate) {
        Ok(answer) => match answer.best_name() {
            Some(name) => PlaceName::resolved(name, coordinate),
            None => {
                debug!("reverse geocode returned no locality fields");
                PlaceName::from_coordinate(coordinate)
            }
        },
        Err(error) => {
            debug!(%error, "reverse geocode failed, using coordinate label");
            PlaceName::from_coordinate(coordinate)
        }
    }
}

pub fn search_place<P: ProviderApi>(
    providers: &P,
    query: &str,
) -> Result<ResolvedPlace, SearchError> {
    let resolved = providers
        .search_place(query)
        .map_err(|error| SearchError::from_provider(query, error))?;

    info!(query, place = %resolved.place, "search resolved");
    Ok(resolved)
}
