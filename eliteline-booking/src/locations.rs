/// Default origin for coded airport/city routes when the form leaves one
/// end of the journey blank.
pub const HOME_BASE: &str = "Chichester";

const AIRPORTS: &[(&str, &str)] = &[
    ("LHR", "London Heathrow Airport (LHR)"),
    ("LGW", "London Gatwick Airport (LGW)"),
    ("STN", "London Stanstead Airport (STN)"),
    ("SOU", "Southampton Airport (SOU)"),
    ("SOU_CRUISE", "Southampton Cruise"),
    ("LTN", "London Luton Airport (LTN)"),
    ("BOH", "Bournemouth Airport (BOH)"),
    ("LCY", "London City Airport (LCY)"),
    ("BQH", "London Biggin Hill Airport (BQH)"),
    ("FAB", "Farnborough Airport (FAB)"),
];

const CITIES: &[(&str, &str)] = &[
    ("LONDON_CENTRAL", "Central London"),
    ("BRIGHTON_HOVE", "Brighton & Hove"),
];

/// Display name for an airport code. Unknown codes pass through verbatim.
pub fn airport_display_name(code: &str) -> &str {
    AIRPORTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Display name for a fixed-route city code. Unknown codes pass through
/// verbatim.
pub fn city_display_name(code: &str) -> &str {
    CITIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve_to_display_names() {
        assert_eq!(airport_display_name("LHR"), "London Heathrow Airport (LHR)");
        assert_eq!(airport_display_name("SOU_CRUISE"), "Southampton Cruise");
        assert_eq!(city_display_name("BRIGHTON_HOVE"), "Brighton & Hove");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(airport_display_name("XYZ"), "XYZ");
        assert_eq!(city_display_name("PORTSMOUTH"), "PORTSMOUTH");
    }
}
