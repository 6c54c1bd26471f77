//! Literal or toolchain-inherited document values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A document value that is either written out or deferred to a defaults
/// provider under a symbolic key such as `flutter.minSdkVersion`.
///
/// In TOML/JSON documents a literal is written as-is and an inherited value
/// as a table: `minSdk = { inherit = "flutter.minSdkVersion" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting<T> {
    /// Written out in the document
    Literal(T),
    /// Deferred to the default stored under `inherit`
    Inherited { inherit: String },
}

impl<T> Setting<T> {
    /// Inherit the value stored under `key`
    pub fn inherit(key: impl Into<String>) -> Self {
        Self::Inherited {
            inherit: key.into(),
        }
    }

    /// The symbolic key, if this value is inherited
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Inherited { inherit } => Some(inherit),
        }
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}

impl<T: fmt::Display> fmt::Display for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Inherited { inherit } => write!(f, "<{inherit}>"),
        }
    }
}
