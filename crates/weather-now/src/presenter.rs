use serde::Serialize;

use crate::model::{DayForecast, PlaceName, WeatherSnapshot};
use crate::status::StatusKind;
use crate::units::{DisplayUnit, format_temperature, format_wind, round_half_up};
use crate::weather_code;

pub const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Place,
    Temperature,
    Condition,
    FeelsLike,
    Humidity,
    Wind,
    Updated,
    Uv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastTile {
    pub day: String,
    pub icon: String,
    pub temperature: String,
    pub label: String,
    pub precipitation: String,
}

/// Named output slots written by the presenter and the session controller.
pub trait DisplaySurface {
    fn set_slot(&mut self, slot: Slot, value: String);
    fn set_forecast(&mut self, tiles: Vec<ForecastTile>);
    fn set_status(&mut self, message: &str, kind: StatusKind);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub message: String,
    pub kind: StatusKind,
}

/// In-memory display surface; what the CLI prints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    pub place: Option<String>,
    pub temperature: Option<String>,
    pub condition: Option<String>,
    pub feels_like: Option<String>,
    pub humidity: Option<String>,
    pub wind: Option<String>,
    pub updated: Option<String>,
    pub uv: Option<String>,
    pub forecast: Vec<ForecastTile>,
    pub status: StatusLine,
}

impl DisplayState {
    pub fn has_weather(&self) -> bool {
        self.temperature.is_some()
    }
}

impl DisplaySurface for DisplayState {
    fn set_slot(&mut self, slot: Slot, value: String) {
        let target = match slot {
            Slot::Place => &mut self.place,
            Slot::Temperature => &mut self.temperature,
            Slot::Condition => &mut self.condition,
            Slot::FeelsLike => &mut self.feels_like,
            Slot::Humidity => &mut self.humidity,
            Slot::Wind => &mut self.wind,
            Slot::Updated => &mut self.updated,
            Slot::Uv => &mut self.uv,
        };
        *target = Some(value);
    }

    fn set_forecast(&mut self, tiles: Vec<ForecastTile>) {
        self.forecast = tiles;
    }

    fn set_status(&mut self, message: &str, kind: StatusKind) {
        self.status = StatusLine {
            message: message.to_string(),
            kind,
        };
    }
}

/// Rewrites every weather slot from scratch; safe to call repeatedly with a
/// different `unit` against the same snapshot.
pub fn render<D: DisplaySurface + ?Sized>(
    surface: &mut D,
    snapshot: &WeatherSnapshot,
    place: &PlaceName,
    unit: DisplayUnit,
) {
    let feels_like = snapshot.feels_like_c.unwrap_or(snapshot.current_temp_c);

    surface.set_slot(Slot::Place, place.to_string());
    surface.set_slot(
        Slot::Temperature,
        format_temperature(snapshot.current_temp_c, unit),
    );
    surface.set_slot(Slot::Condition, weather_code::display(snapshot.condition_code));
    surface.set_slot(Slot::FeelsLike, format_temperature(feels_like, unit));
    surface.set_slot(Slot::Humidity, format_humidity(snapshot.humidity_pct));
    surface.set_slot(Slot::Wind, format_wind(snapshot.wind_speed_kmh, unit));
    surface.set_slot(
        Slot::Updated,
        snapshot.observed_at.format("%d %b, %H:%M").to_string(),
    );
    surface.set_slot(Slot::Uv, format_uv(snapshot.uv_index()));
    surface.set_forecast(
        snapshot
            .forecast
            .iter()
            .map(|day| forecast_tile(day, unit))
            .collect(),
    );
}

fn forecast_tile(day: &DayForecast, unit: DisplayUnit) -> ForecastTile {
    let condition = weather_code::resolve(day.condition_code);
    ForecastTile {
        day: day.date.format("%a %d %b").to_string(),
        icon: condition.icon.to_string(),
        temperature: format!(
            "{} / {}",
            format_temperature(day.max_temp_c, unit),
            format_temperature(day.min_temp_c, unit)
        ),
        label: condition.label.to_string(),
        precipitation: format_precipitation(day.precipitation_mm),
    }
}

pub fn format_humidity(humidity_pct: Option<f64>) -> String {
    humidity_pct
        .map(|value| format!("{}%", round_half_up(value)))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_uv(uv_index: Option<f64>) -> String {
    uv_index
        .map(|value| format!("{value:.1}"))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_precipitation(precipitation_mm: Option<f64>) -> String {
    match precipitation_mm {
        Some(value) => format!("{value:.1} mm"),
        None => "0 mm".to_string(),
    }
}
