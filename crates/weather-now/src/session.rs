//! End-to-end flow: startup auto-load, "use my location", search and unit
//! toggle. Every failure is turned into a status message here; nothing
//! propagates past the controller.

use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::forecast;
use crate::locator::{DeviceLocator, LocationOptions};
use crate::model::{Coordinate, PlaceName, WeatherSnapshot, normalize_query};
use crate::presenter::{self, DisplaySurface};
use crate::providers::ProviderApi;
use crate::resolver;
use crate::status::{self, Event, Status, Trigger};
use crate::units::DisplayUnit;

/// Mutable state of one interactive session. Snapshot and place are
/// replaced together on each successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub unit: DisplayUnit,
    pub last_snapshot: Option<WeatherSnapshot>,
    pub last_place: Option<PlaceName>,
    pub status: Status,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            unit: DisplayUnit::Metric,
            last_snapshot: None,
            last_place: None,
            status: Status::idle(),
        }
    }
}

pub struct SessionController<P, L, D> {
    providers: P,
    locator: L,
    surface: D,
    options: LocationOptions,
    session: Session,
}

impl<P, L, D> SessionController<P, L, D>
where
    P: ProviderApi,
    L: DeviceLocator,
    D: DisplaySurface,
{
    pub fn new(providers: P, locator: L, surface: D, options: LocationOptions) -> Self {
        Self {
            providers,
            locator,
            surface,
            options,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Silent device-location attempt made once at launch.
    pub fn start(&mut self) {
        self.locate_and_load(Trigger::Startup);
    }

    pub fn on_request_location(&mut self) {
        self.locate_and_load(Trigger::Manual);
    }

    pub fn on_search(&mut self, raw_query: &str) {
        let Ok(query) = normalize_query(raw_query) else {
            debug!("ignoring blank search query");
            return;
        };

        self.advance(Event::SearchRequested(&query));
        match resolver::search_place(&self.providers, &query) {
            Ok(resolved) => {
                self.advance(Event::SearchMatched);
                self.load(resolved.coordinate, resolved.place);
            }
            Err(SearchError::NoResultsFound(_)) => {
                info!(query = %query, "search returned no results");
                self.advance(Event::NoResults(&query));
            }
            Err(error) => {
                warn!(%error, "search failed");
                self.advance(Event::SearchFailed);
            }
        }
    }

    /// Re-renders the held snapshot in the other unit. Never touches the
    /// network.
    pub fn on_toggle_unit(&mut self) {
        self.session.unit = self.session.unit.toggled();
        info!(unit = ?self.session.unit, "display unit toggled");

        let (Some(snapshot), Some(place)) = (
            self.session.last_snapshot.as_ref(),
            self.session.last_place.as_ref(),
        ) else {
            return;
        };
        presenter::render(&mut self.surface, snapshot, place, self.session.unit);
        self.advance(Event::UnitToggled(self.session.unit));
    }

    fn locate_and_load(&mut self, trigger: Trigger) {
        self.advance(Event::LocateRequested(trigger));

        let coordinate = match resolver::acquire_device_location(&self.locator, &self.options) {
            Ok(coordinate) => coordinate,
            Err(error) => {
                warn!(%error, ?trigger, "device location failed");
                self.advance(Event::LocationFailed(trigger, &error));
                return;
            }
        };

        self.advance(Event::LocationAcquired);
        let place = resolver::reverse_lookup(&self.providers, coordinate);
        self.advance(Event::PlaceResolved);
        self.load(coordinate, place);
    }

    fn load(&mut self, coordinate: Coordinate, place: PlaceName) {
        match forecast::fetch(&self.providers, coordinate) {
            Ok(snapshot) => {
                presenter::render(&mut self.surface, &snapshot, &place, self.session.unit);
                self.session.last_snapshot = Some(snapshot);
                self.session.last_place = Some(place);
                self.advance(Event::WeatherLoaded);
            }
            Err(error) => {
                warn!(%error, place = %place, "weather fetch failed");
                self.advance(Event::WeatherFailed);
            }
        }
    }

    fn advance(&mut self, event: Event<'_>) {
        let Some(next) = status::transition(&self.session.status, event) else {
            warn!(stage = ?self.session.status.stage, ?event, "ignoring out-of-order status event");
            return;
        };

        debug!(stage = ?next.stage, kind = next.kind.as_str(), message = %next.message, "status changed");
        self.surface.set_status(&next.message, next.kind);
        self.session.status = next;
    }
}
