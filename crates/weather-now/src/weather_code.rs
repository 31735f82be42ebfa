#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub label: &'static str,
    pub icon: &'static str,
}

pub const UNKNOWN: Condition = Condition {
    label: "Unknown",
    icon: "❓",
};

const GROUPS: &[(&[i32], Condition)] = &[
    (&[0], condition("Clear sky", "☀️")),
    (&[1, 2, 3], condition("Partly cloudy", "⛅")),
    (&[45, 48], condition("Fog", "🌫️")),
    (&[51, 53, 55], condition("Drizzle", "🌦️")),
    (&[61, 63, 65], condition("Rain", "🌧️")),
    (&[66, 67], condition("Freezing rain", "🌧️🧊")),
    (&[71, 73, 75], condition("Snow", "🌨️")),
    (&[77], condition("Snow grains", "❄️")),
    (&[80, 81, 82], condition("Showers", "🌦️")),
    (&[85, 86], condition("Snow showers", "🌨️")),
    (&[95], condition("Thunderstorm", "⛈️")),
    (&[96, 99], condition("Thunderstorm & hail", "⛈️🧊")),
];

const fn condition(label: &'static str, icon: &'static str) -> Condition {
    Condition { label, icon }
}

pub fn resolve(code: i32) -> Condition {
    GROUPS
        .iter()
        .find(|(codes, _)| codes.contains(&code))
        .map(|(_, condition)| *condition)
        .unwrap_or(UNKNOWN)
}

/// `"{icon} {label}"`, the form shown in the condition slot.
pub fn display(code: i32) -> String {
    let condition = resolve(code);
    format!("{} {}", condition.icon, condition.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_code_maps_every_group_member() {
        for (codes, expected) in GROUPS {
            for code in *codes {
                assert_eq!(resolve(*code), *expected, "code {code}");
            }
        }
    }

    #[test]
    fn weather_code_groups_do_not_overlap() {
        let mut seen = Vec::new();
        for (codes, _) in GROUPS {
            for code in *codes {
                assert!(!seen.contains(code), "duplicate code {code}");
                seen.push(*code);
            }
        }
    }

    #[test]
    fn weather_code_unknown_codes_fall_back() {
        for code in [-1, 4, 44, 56, 57, 100, 999] {
            assert_eq!(resolve(code), UNKNOWN);
        }
        assert_eq!(UNKNOWN.label, "Unknown");
        assert_eq!(UNKNOWN.icon, "❓");
    }

    #[test]
    fn weather_code_display_joins_icon_and_label() {
        assert_eq!(display(3), "⛅ Partly cloudy");
        assert_eq!(display(96), "⛈️🧊 Thunderstorm & hail");
    }
}
