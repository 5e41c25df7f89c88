//! ISO 3166-1 alpha-2 country codes mapped to display names.

/// Code/display-name pairs. `"Unknown"` maps to itself.
pub const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("GB", "United Kingdom"),
    ("IN", "India"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("IT", "Italy"),
    ("ES", "Spain"),
    ("NL", "Netherlands"),
    ("BR", "Brazil"),
    ("MX", "Mexico"),
    ("AR", "Argentina"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("CN", "China"),
    ("TW", "Taiwan"),
    ("HK", "Hong Kong"),
    ("PK", "Pakistan"),
    ("BD", "Bangladesh"),
    ("PH", "Philippines"),
    ("VN", "Vietnam"),
    ("TH", "Thailand"),
    ("ID", "Indonesia"),
    ("MY", "Malaysia"),
    ("SG", "Singapore"),
    ("NP", "Nepal"),
    ("LK", "Sri Lanka"),
    ("SA", "Saudi Arabia"),
    ("AE", "United Arab Emirates"),
    ("TR", "Turkey"),
    ("EG", "Egypt"),
    ("IL", "Israel"),
    ("RU", "Russia"),
    ("PL", "Poland"),
    ("UA", "Ukraine"),
    ("RO", "Romania"),
    ("CZ", "Czech Republic"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("DK", "Denmark"),
    ("FI", "Finland"),
    ("GR", "Greece"),
    ("PT", "Portugal"),
    ("BE", "Belgium"),
    ("AT", "Austria"),
    ("CH", "Switzerland"),
    ("IE", "Ireland"),
    ("ZA", "South Africa"),
    ("NG", "Nigeria"),
    ("KE", "Kenya"),
    ("GH", "Ghana"),
    ("TZ", "Tanzania"),
    ("PE", "Peru"),
    ("EC", "Ecuador"),
    ("VE", "Venezuela"),
    ("UY", "Uruguay"),
    ("PY", "Paraguay"),
    ("NZ", "New Zealand"),
    ("KH", "Cambodia"),
    ("LA", "Laos"),
    ("MM", "Myanmar"),
    ("KZ", "Kazakhstan"),
    ("HU", "Hungary"),
    ("SK", "Slovakia"),
    ("BG", "Bulgaria"),
    ("HR", "Croatia"),
    ("RS", "Serbia"),
    ("SI", "Slovenia"),
    ("LT", "Lithuania"),
    ("LV", "Latvia"),
    ("EE", "Estonia"),
    ("BY", "Belarus"),
    ("MA", "Morocco"),
    ("DZ", "Algeria"),
    ("TN", "Tunisia"),
    ("LY", "Libya"),
    ("JO", "Jordan"),
    ("IQ", "Iraq"),
    ("LB", "Lebanon"),
    ("CY", "Cyprus"),
    ("QA", "Qatar"),
    ("OM", "Oman"),
    ("BH", "Bahrain"),
    ("UG", "Uganda"),
    ("ZW", "Zimbabwe"),
    ("PR", "Puerto Rico"),
    ("SV", "El Salvador"),
    ("CR", "Costa Rica"),
    ("HN", "Honduras"),
    ("GT", "Guatemala"),
    ("PA", "Panama"),
    ("DO", "Dominican Republic"),
    ("JM", "Jamaica"),
    ("TT", "Trinidad and Tobago"),
    ("BS", "Bahamas"),
    ("BB", "Barbados"),
    ("AL", "Albania"),
    ("MK", "North Macedonia"),
    ("BA", "Bosnia and Herzegovina"),
    ("ME", "Montenegro"),
    ("GE", "Georgia"),
    ("AM", "Armenia"),
    ("AZ", "Azerbaijan"),
    ("IS", "Iceland"),
    ("LU", "Luxembourg"),
    ("MT", "Malta"),
    ("MC", "Monaco"),
    ("MD", "Moldova"),
    ("BM", "Bermuda"),
    ("AG", "Antigua and Barbuda"),
    ("VI", "U.S. Virgin Islands"),
    ("UM", "U.S. Minor Outlying Islands"),
    ("CX", "Christmas Island"),
    ("GM", "Gambia"),
    ("AF", "Afghanistan"),
    ("AQ", "Antarctica"),
    ("Unknown", "Unknown"),
];

pub const UNKNOWN: &str = "Unknown";

pub fn display_name(code: &str) -> Option<&'static str> {
    COUNTRY_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn maps_known_codes() {
        assert_eq!(display_name("US"), Some("United States"));
        assert_eq!(display_name("KR"), Some("South Korea"));
        assert_eq!(display_name(UNKNOWN), Some(UNKNOWN));
    }

    #[test]
    fn unmapped_codes_return_none() {
        assert_eq!(display_name("ZZ"), None);
        assert_eq!(display_name("us"), None);
    }

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<&str> = COUNTRY_NAMES.iter().map(|(code, _)| *code).collect();
        assert_eq!(codes.len(), COUNTRY_NAMES.len());
        assert_eq!(COUNTRY_NAMES.len(), 120);
    }
}
