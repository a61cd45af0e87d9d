//! Translation of provider condition descriptions to internal codes

/// Map a provider description to a short code.
///
/// Matching is exact. Descriptions without a mapping are returned unchanged.
pub fn translate(text: &str) -> String {
    let code = match text {
        "Sunny" => "sunny",
        "Clear" => "clear",
        "Partly cloudy" | "Partly Cloudy" => "partly_cloudy",
        "Cloudy" => "cloudy",
        "Overcast" => "overcast",
        "Mist" => "mist",
        "Fog" | "Freezing fog" => "fog",
        "Patchy rain possible"
        | "Patchy rain nearby"
        | "Patchy light rain"
        | "Light rain"
        | "Moderate rain at times"
        | "Moderate rain"
        | "Heavy rain at times"
        | "Heavy rain"
        | "Light rain shower"
        | "Moderate or heavy rain shower"
        | "Torrential rain shower" => "rain",
        "Patchy light drizzle" | "Light drizzle" | "Freezing drizzle" => "drizzle",
        "Thundery outbreaks possible"
        | "Thundery outbreaks in nearby"
        | "Patchy light rain with thunder"
        | "Moderate or heavy rain with thunder" => "storm",
        "Patchy snow possible"
        | "Patchy snow nearby"
        | "Light snow"
        | "Moderate snow"
        | "Heavy snow"
        | "Blizzard" => "snow",
        other => return other.to_string(),
    };
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_descriptions_collapse_to_codes() {
        assert_eq!(translate("Sunny"), "sunny");
        assert_eq!(translate("Partly cloudy"), "partly_cloudy");
        assert_eq!(translate("Moderate rain at times"), "rain");
        assert_eq!(translate("Moderate or heavy rain with thunder"), "storm");
        assert_eq!(translate("Light drizzle"), "drizzle");
    }

    #[test]
    fn matching_is_exact() {
        assert_eq!(translate("SUNNY"), "SUNNY");
        assert_eq!(translate("Sunny "), "Sunny ");
    }

    #[test]
    fn unknown_descriptions_pass_through() {
        assert_eq!(translate("Ice pellets"), "Ice pellets");
    }
}
