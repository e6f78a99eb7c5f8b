use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for passenger-identifying values (names, contact details).
///
/// `Debug`/`Display` render a fixed mask so PII cannot reach log output via
/// `tracing` format macros; serialization stays transparent because outbound
/// order documents need the real value.
#[derive(Clone, PartialEq, Deserialize)]
pub struct Masked<T>(pub T);

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("******")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("******")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}
