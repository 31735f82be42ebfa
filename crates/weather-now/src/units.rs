use serde::{Deserialize, Serialize};

const KM_PER_MILE: f64 = 1.60934;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayUnit {
    #[default]
    Metric,
    Imperial,
}

impl DisplayUnit {
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    pub fn wind_symbol(self) -> &'static str {
        match self {
            Self::Metric => "km/h",
            Self::Imperial => "mph",
        }
    }
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn to_mph(kmh: f64) -> f64 {
    kmh / KM_PER_MILE
}

pub fn format_temperature(celsius: f64, unit: DisplayUnit) -> String {
    let value = match unit {
        DisplayUnit::Metric => celsius,
        DisplayUnit::Imperial => to_fahrenheit(celsius),
    };
    format!("{}{}", round_half_up(value), unit.temperature_symbol())
}

pub fn format_wind(kmh: f64, unit: DisplayUnit) -> String {
    let value = match unit {
        DisplayUnit::Metric => kmh,
        DisplayUnit::Imperial => to_mph(kmh),
    };
    format!("{} {}", round_half_up(value), unit.wind_symbol())
}

/// Rounds halves toward positive infinity and never yields a negative zero,
/// so `-0.4` prints as `0`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_format_freezing_and_boiling_points() {
        assert_eq!(format_temperature(0.0, DisplayUnit::Metric), "0°C");
        assert_eq!(format_temperature(0.0, DisplayUnit::Imperial), "32°F");
        assert_eq!(format_temperature(100.0, DisplayUnit::Imperial), "212°F");
    }

    #[test]
    fn units_wind_converts_to_whole_mph() {
        assert_eq!(format_wind(160.934, DisplayUnit::Imperial), "100 mph");
        assert_eq!(format_wind(12.4, DisplayUnit::Metric), "12 km/h");
    }

    #[test]
    fn units_round_half_up_without_negative_zero() {
        assert_eq!(format_temperature(-0.4, DisplayUnit::Metric), "0°C");
        assert_eq!(format_temperature(2.5, DisplayUnit::Metric), "3°C");
        assert_eq!(format_temperature(-2.5, DisplayUnit::Metric), "-2°C");
    }

    #[test]
    fn units_toggle_twice_restores_output() {
        let unit = DisplayUnit::Metric;
        let before = format_temperature(21.3, unit);
        let after = format_temperature(21.3, unit.toggled().toggled());

        assert_eq!(unit.toggled(), DisplayUnit::Imperial);
        assert_eq!(before, after);
    }

    #[test]
    fn units_conversions_are_linear() {
        assert_eq!(to_fahrenheit(-40.0), -40.0);
        assert!((to_mph(1.60934) - 1.0).abs() < 1e-12);
    }
}
