use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Carrier designator grammar: 2-3 uppercase alphanumerics. A purely numeric
/// token ("12") is never a carrier code, so at least one letter is required.
static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Z][A-Z0-9]{1,2}|[0-9][A-Z][A-Z0-9]?)$").expect("valid airline code pattern")
});

/// A validated 2-3 character airline designator ("KL", "QR", "9W").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirlineCode(String);

impl AirlineCode {
    /// Parse a candidate designator, returning `None` when it doesn't match
    /// the carrier-code grammar.
    pub fn parse(code: &str) -> Option<Self> {
        if is_airline_code(code) {
            Some(Self(code.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirlineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AirlineCode {
    type Err = InvalidAirlineCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidAirlineCode(s.to_string()))
    }
}

impl TryFrom<String> for AirlineCode {
    type Error = InvalidAirlineCode;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AirlineCode> for String {
    fn from(code: AirlineCode) -> Self {
        code.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("not a valid airline code: {0:?}")]
pub struct InvalidAirlineCode(pub String);

/// Whether a string matches the 2-3 character carrier-code grammar.
pub fn is_airline_code(s: &str) -> bool {
    CODE_PATTERN.is_match(s)
}

/// Split a composite `<CODE>-<suffix>` reference key ("KL-SEG1" -> KL, "SEG1").
///
/// Returns `None` for keys without a parseable carrier prefix; callers treat
/// those as plain, airline-less keys rather than an error.
pub fn split_prefixed_key(key: &str) -> Option<(AirlineCode, &str)> {
    let (prefix, suffix) = key.split_once('-')?;
    if suffix.is_empty() {
        return None;
    }
    AirlineCode::parse(prefix).map(|code| (code, suffix))
}

/// Whether a key carries an airline prefix.
pub fn is_prefixed_key(key: &str) -> bool {
    split_prefixed_key(key).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_iata_style_codes() {
        for code in ["KL", "QR", "AF", "LH", "9W", "U2", "ETH", "3K"] {
            assert!(is_airline_code(code), "{code} should be valid");
        }
    }

    #[test]
    fn test_rejects_non_codes() {
        for code in ["K", "KLMX", "kl", "12", "9", "", "K-", "A B"] {
            assert!(!is_airline_code(code), "{code} should be invalid");
        }
    }

    #[test]
    fn test_split_prefixed_key() {
        let (code, suffix) = split_prefixed_key("KL-SEG1").unwrap();
        assert_eq!(code.as_str(), "KL");
        assert_eq!(suffix, "SEG1");

        // Suffix keeps any further dashes
        let (code, suffix) = split_prefixed_key("QR-T-1").unwrap();
        assert_eq!(code.as_str(), "QR");
        assert_eq!(suffix, "T-1");
    }

    #[test]
    fn test_split_rejects_plain_keys() {
        assert!(split_prefixed_key("PAX1").is_none());
        assert!(split_prefixed_key("KL-").is_none());
        assert!(split_prefixed_key("12-T1").is_none());
        assert!(split_prefixed_key("TRAVELER-1").is_none());

        assert!(is_prefixed_key("KL-SEG1"));
        assert!(!is_prefixed_key("PAX1"));
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let code: AirlineCode = serde_json::from_str("\"EK\"").unwrap();
        assert_eq!(code.as_str(), "EK");
        assert!(serde_json::from_str::<AirlineCode>("\"lowercase\"").is_err());
    }
}
