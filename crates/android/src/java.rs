//! Java language compatibility levels

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A Java compatibility level, stored as the major version (1.8 is 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JavaVersion(u8);

impl JavaVersion {
    /// `JavaVersion.VERSION_1_8`
    pub const VERSION_1_8: Self = Self(8);
    /// `JavaVersion.VERSION_11`
    pub const VERSION_11: Self = Self(11);
    /// `JavaVersion.VERSION_17`
    pub const VERSION_17: Self = Self(17);
    /// `JavaVersion.VERSION_21`
    pub const VERSION_21: Self = Self(21);

    /// Lowest level accepted (`VERSION_1_1`)
    pub const MIN_MAJOR: u8 = 1;
    /// Highest level accepted
    pub const MAX_MAJOR: u8 = 26;

    /// Construct from a major version number
    pub fn from_major(major: u8) -> Option<Self> {
        (Self::MIN_MAJOR..=Self::MAX_MAJOR)
            .contains(&major)
            .then_some(Self(major))
    }

    /// Major version (8 for 1.8)
    pub fn major(self) -> u8 {
        self.0
    }
}

impl Default for JavaVersion {
    fn default() -> Self {
        Self::VERSION_1_8
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= 8 {
            write!(f, "1.{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Error returned when a string is not a recognised Java level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a Java version: {0:?}")]
pub struct ParseJavaVersionError(String);

impl FromStr for JavaVersion {
    type Err = ParseJavaVersionError;

    /// Accepts `JavaVersion.VERSION_11`, `VERSION_1_8`, `1.8`, `11`,
    /// optionally followed by `.toString()` and surrounding quotes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseJavaVersionError(s.to_string());

        let trimmed = s.trim().trim_matches('"');
        let trimmed = trimmed.strip_suffix(".toString()").unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix("JavaVersion.").unwrap_or(trimmed);
        let numeric = match trimmed.strip_prefix("VERSION_") {
            Some(rest) => rest.replace('_', "."),
            None => trimmed.to_string(),
        };

        let major = match numeric.strip_prefix("1.") {
            Some(minor) => minor.parse::<u8>().map_err(|_| err())?,
            None => numeric.parse::<u8>().map_err(|_| err())?,
        };

        Self::from_major(major).ok_or_else(err)
    }
}

impl Serialize for JavaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JavaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u8),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(major) => JavaVersion::from_major(major)
                .ok_or_else(|| serde::de::Error::custom(format!("not a Java version: {major}"))),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
