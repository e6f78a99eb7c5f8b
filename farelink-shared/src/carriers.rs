use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Read-only attributes for carriers the integration is certified against.
/// Unknown carriers fall back to permissive defaults; the upstream API is the
/// final authority on what an airline actually supports.
#[derive(Debug, Clone)]
pub struct Carrier {
    pub code: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    pub seat_selection: bool,
    pub service_list: bool,
}

static CARRIERS: Lazy<HashMap<&'static str, Carrier>> = Lazy::new(|| {
    let rows = [
        ("AA", "American Airlines", "US", true, true),
        ("AF", "Air France", "FR", true, true),
        ("BA", "British Airways", "GB", true, true),
        ("DL", "Delta Air Lines", "US", true, true),
        ("EK", "Emirates", "AE", true, true),
        ("ET", "Ethiopian Airlines", "ET", false, true),
        ("KL", "KLM Royal Dutch Airlines", "NL", true, true),
        ("KQ", "Kenya Airways", "KE", false, false),
        ("LH", "Lufthansa", "DE", true, true),
        ("QR", "Qatar Airways", "QA", true, true),
        ("SQ", "Singapore Airlines", "SG", true, true),
        ("SV", "Saudia", "SA", true, false),
        ("TK", "Turkish Airlines", "TR", true, true),
        ("UA", "United Airlines", "US", true, true),
        ("WY", "Oman Air", "OM", false, true),
    ];
    rows.into_iter()
        .map(|(code, name, country, seat_selection, service_list)| {
            (
                code,
                Carrier {
                    code,
                    name,
                    country,
                    seat_selection,
                    service_list,
                },
            )
        })
        .collect()
});

pub fn lookup(code: &str) -> Option<&'static Carrier> {
    CARRIERS.get(code)
}

/// Human-readable carrier name, falling back to the raw code.
pub fn display_name(code: &str) -> &str {
    lookup(code).map(|c| c.name).unwrap_or(code)
}

pub fn supports_seat_selection(code: &str) -> bool {
    lookup(code).map(|c| c.seat_selection).unwrap_or(true)
}

pub fn supports_service_list(code: &str) -> bool {
    lookup(code).map(|c| c.service_list).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_carrier_lookup() {
        let kl = lookup("KL").unwrap();
        assert_eq!(kl.name, "KLM Royal Dutch Airlines");
        assert_eq!(kl.country, "NL");
        assert!(kl.seat_selection);
    }

    #[test]
    fn test_unknown_carrier_defaults() {
        assert!(lookup("ZZ").is_none());
        assert_eq!(display_name("ZZ"), "ZZ");
        // Permissive defaults for carriers we have no record for
        assert!(supports_seat_selection("ZZ"));
        assert!(supports_service_list("ZZ"));
    }

    #[test]
    fn test_capability_flags() {
        assert!(!supports_seat_selection("ET"));
        assert!(!supports_service_list("KQ"));
    }
}
