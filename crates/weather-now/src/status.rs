//! Status line state machine.
//!
//! ```text
//! Idle ─▶ Locating ─▶ ReverseGeocoding ─▶ FetchingWeather ─▶ Rendered(ok)
//!   │        └──────────────────────────────────┬──────────▶ Rendered(warn)
//!   └───▶ Searching ─────────▶ FetchingWeather  └──────────▶ Rendered(bad)
//! ```
//!
//! New requests may start from any stage; the last one to finish wins.

use serde::Serialize;

use crate::error::LocationError;
use crate::units::DisplayUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    #[default]
    Neutral,
    Ok,
    Warn,
    Bad,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Locating,
    Searching,
    ReverseGeocoding,
    FetchingWeather,
    Rendered(StatusKind),
}

/// Who asked for the device location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    LocateRequested(Trigger),
    LocationAcquired,
    LocationFailed(Trigger, &'a LocationError),
    PlaceResolved,
    SearchRequested(&'a str),
    SearchMatched,
    NoResults(&'a str),
    SearchFailed,
    WeatherLoaded,
    WeatherFailed,
    UnitToggled(DisplayUnit),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub stage: Stage,
    pub message: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn idle() -> Self {
        Self {
            stage: Stage::Idle,
            message: String::new(),
            kind: StatusKind::Neutral,
        }
    }

    fn in_flight(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            kind: StatusKind::Neutral,
        }
    }

    fn rendered(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Rendered(kind),
            message: message.into(),
            kind,
        }
    }
}

/// Returns `None` when `event` is not valid from the current stage.
pub fn transition(current: &Status, event: Event<'_>) -> Option<Status> {
    let next = match (current.stage, event) {
        (_, Event::LocateRequested(Trigger::Startup)) => {
            Status::in_flight(Stage::Locating, "Detecting your location…")
        }
        (_, Event::LocateRequested(Trigger::Manual)) => {
            Status::in_flight(Stage::Locating, "Requesting location…")
        }
        (_, Event::SearchRequested(query)) => {
            Status::in_flight(Stage::Searching, format!("Searching for \"{query}\"…"))
        }
        (Stage::Locating, Event::LocationAcquired) => {
            Status::in_flight(Stage::ReverseGeocoding, "Looking up place name…")
        }
        (Stage::Locating, Event::LocationFailed(trigger, error)) => {
            Status::rendered(StatusKind::Warn, location_failure_message(trigger, error))
        }
        (Stage::ReverseGeocoding, Event::PlaceResolved)
        | (Stage::Searching, Event::SearchMatched) => {
            Status::in_flight(Stage::FetchingWeather, "Fetching weather…")
        }
        (Stage::Searching, Event::NoResults(query)) => {
            Status::rendered(StatusKind::Warn, format!("No results for \"{query}\""))
        }
        (Stage::Searching, Event::SearchFailed) => {
            Status::rendered(StatusKind::Bad, "Could not search location.")
        }
        (Stage::FetchingWeather, Event::WeatherLoaded) => {
            Status::rendered(StatusKind::Ok, "Live weather loaded ✓")
        }
        (Stage::FetchingWeather, Event::WeatherFailed) => Status::rendered(
            StatusKind::Bad,
            "Could not load weather. Check your internet connection or try again.",
        ),
        (Stage::Rendered(_), Event::UnitToggled(unit)) => Status::rendered(
            StatusKind::Ok,
            format!("Showing {}", unit.temperature_symbol()),
        ),
        _ => return None,
    };
    Some(next)
}

fn location_failure_message(trigger: Trigger, error: &LocationError) -> &'static str {
    match (trigger, error) {
        (Trigger::Startup, _) => "Use \"locate\" and allow location access, or search for a place.",
        (Trigger::Manual, LocationError::PermissionDenied) => {
            "Permission denied. Please allow location access."
        }
        (Trigger::Manual, _) => "Could not get your location.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(events: &[Event<'_>]) -> Status {
        events.iter().fold(Status::idle(), |status, event| {
            transition(&status, *event).expect("valid transition")
        })
    }

    #[test]
    fn status_location_chain_ends_ok() {
        let status = run(&[
            Event::LocateRequested(Trigger::Startup),
            Event::LocationAcquired,
            Event::PlaceResolved,
            Event::WeatherLoaded,
        ]);

        assert_eq!(status.stage, Stage::Rendered(StatusKind::Ok));
        assert_eq!(status.kind, StatusKind::Ok);
        assert_eq!(status.message, "Live weather loaded ✓");
    }

    #[test]
    fn status_in_flight_stages_are_neutral() {
        let status = run(&[Event::LocateRequested(Trigger::Manual), Event::LocationAcquired]);

        assert_eq!(status.stage, Stage::ReverseGeocoding);
        assert_eq!(status.kind, StatusKind::Neutral);
    }

    #[test]
    fn status_manual_permission_denied_has_distinct_message() {
        let denied = LocationError::PermissionDenied;
        let timeout = LocationError::Timeout;

        let status = run(&[
            Event::LocateRequested(Trigger::Manual),
            Event::LocationFailed(Trigger::Manual, &denied),
        ]);
        assert_eq!(status.kind, StatusKind::Warn);
        assert!(status.message.starts_with("Permission denied"));

        let status = run(&[
            Event::LocateRequested(Trigger::Manual),
            Event::LocationFailed(Trigger::Manual, &timeout),
        ]);
        assert_eq!(status.message, "Could not get your location.");
    }

    #[test]
    fn status_startup_failure_prompts_manual_action() {
        let denied = LocationError::PermissionDenied;
        let status = run(&[
            Event::LocateRequested(Trigger::Startup),
            Event::LocationFailed(Trigger::Startup, &denied),
        ]);

        assert_eq!(status.stage, Stage::Rendered(StatusKind::Warn));
        assert!(status.message.contains("locate"));
    }

    #[test]
    fn status_search_no_results_echoes_query() {
        let status = run(&[
            Event::SearchRequested("Xyzzy Town"),
            Event::NoResults("Xyzzy Town"),
        ]);

        assert_eq!(status.kind, StatusKind::Warn);
        assert_eq!(status.message, "No results for \"Xyzzy Town\"");
    }

    #[test]
    fn status_fetch_failure_after_reverse_geocode_is_bad() {
        let status = run(&[
            Event::LocateRequested(Trigger::Manual),
            Event::LocationAcquired,
            Event::PlaceResolved,
            Event::WeatherFailed,
        ]);

        assert_eq!(status.stage, Stage::Rendered(StatusKind::Bad));
    }

    #[test]
    fn status_unit_toggle_only_applies_once_rendered() {
        assert_eq!(
            transition(&Status::idle(), Event::UnitToggled(DisplayUnit::Imperial)),
            None
        );

        let status = run(&[
            Event::SearchRequested("Oslo"),
            Event::SearchFailed,
            Event::UnitToggled(DisplayUnit::Imperial),
        ]);
        assert_eq!(status.kind, StatusKind::Ok);
        assert_eq!(status.message, "Showing °F");
    }

    #[test]
    fn status_rejects_out_of_order_events() {
        assert_eq!(transition(&Status::idle(), Event::WeatherLoaded), None);
        assert_eq!(transition(&Status::idle(), Event::LocationAcquired), None);
    }

    #[test]
    fn status_new_request_may_interrupt_in_flight_stage() {
        let status = run(&[
            Event::LocateRequested(Trigger::Manual),
            Event::SearchRequested("Rome"),
        ]);
        assert_eq!(status.stage, Stage::Searching);
    }
}
