//! Plugin references

use crate::document::RawPlugin;
use crate::error::ValidationError;
use semver::{Version, VersionReq};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Short ids Gradle resolves to a longer canonical plugin id.
const ALIASES: &[(&str, &str)] = &[
    ("kotlin-android", "org.jetbrains.kotlin.android"),
    ("kotlin-kapt", "org.jetbrains.kotlin.kapt"),
    ("kotlin-parcelize", "org.jetbrains.kotlin.plugin.parcelize"),
    ("android", "com.android.application"),
    ("android-library", "com.android.library"),
];

/// Canonical form of a plugin id, used for uniqueness checks
pub fn canonical_id(id: &str) -> &str {
    let id = id.trim();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == id)
        .map_or(id, |(_, canonical)| *canonical)
}

/// A plugin version exactly as the document wrote it
///
/// Gradle treats a bare version as a pin, `1.+` as a prefix and anything
/// else (`1.0.0.RELEASE`, `[1.0,2.0)`, `latest.release`) as a notation of
/// its own. Pins and prefixes also carry a semver requirement; other
/// notations are kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginVersion {
    text: String,
    requirement: Option<VersionReq>,
}

impl PluginVersion {
    /// Parse a Gradle version notation. Only blank or whitespace-bearing
    /// text is rejected.
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.is_empty() {
            return Err("version is empty".to_string());
        }
        if text.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
            return Err("version contains whitespace or quotes".to_string());
        }

        let requirement = if Version::parse(text).is_ok() {
            VersionReq::parse(&format!("={text}")).ok()
        } else if let Some(prefix) = text.strip_suffix('+') {
            match prefix.strip_suffix('.') {
                Some(prefix) => VersionReq::parse(&format!("{prefix}.*")).ok(),
                None if prefix.is_empty() => Some(VersionReq::STAR),
                None => None,
            }
        } else {
            None
        };

        Ok(Self {
            text: text.to_string(),
            requirement,
        })
    }

    /// The notation as written
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Semver requirement for pins and prefixes
    pub fn requirement(&self) -> Option<&VersionReq> {
        self.requirement.as_ref()
    }

    /// Whether `version` satisfies this notation, when that is decidable
    pub fn matches(&self, version: &Version) -> Option<bool> {
        self.requirement.as_ref().map(|req| req.matches(version))
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for PluginVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// A resolved plugin application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginRef {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<PluginVersion>,
}

impl PluginRef {
    /// Canonicalise the id and parse the version notation
    pub fn from_raw(raw: &RawPlugin) -> Result<Self, ValidationError> {
        let id = canonical_id(&raw.id).to_string();
        let version = raw
            .version
            .as_deref()
            .map(|constraint| {
                PluginVersion::parse(constraint).map_err(|reason| {
                    ValidationError::InvalidPluginVersion {
                        id: id.clone(),
                        constraint: constraint.to_string(),
                        reason,
                    }
                })
            })
            .transpose()?;
        Ok(Self { id, version })
    }

    /// Canonical plugin id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Requested version, if any
    pub fn version(&self) -> Option<&PluginVersion> {
        self.version.as_ref()
    }
}

/// Resolve a plugin list, keeping document order. Fails on the first id
/// that repeats after canonicalisation.
pub fn resolve_plugins(raw: &[RawPlugin]) -> Result<Vec<PluginRef>, ValidationError> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut plugins = Vec::with_capacity(raw.len());

    for entry in raw {
        let plugin = PluginRef::from_raw(entry)?;
        if !seen.insert(plugin.id.clone()) {
            return Err(ValidationError::DuplicatePlugin { id: plugin.id });
        }
        plugins.push(plugin);
    }

    Ok(plugins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id("kotlin-android"), "org.jetbrains.kotlin.android");
        assert_eq!(canonical_id("dev.flutter.flutter-gradle-plugin"), "dev.flutter.flutter-gradle-plugin");
        assert_eq!(canonical_id(" android "), "com.android.application");
    }

    #[test]
    fn test_resolve_keeps_order() {
        let plugins = resolve_plugins(&[
            RawPlugin::new("com.android.application"),
            RawPlugin::new("kotlin-android"),
            RawPlugin::new("dev.flutter.flutter-gradle-plugin"),
        ])
        .unwrap();
        let ids: Vec<&str> = plugins.iter().map(PluginRef::id).collect();
        assert_eq!(
            ids,
            ["com.android.application", "org.jetbrains.kotlin.android", "dev.flutter.flutter-gradle-plugin"]
        );
    }

    #[test]
    fn test_duplicate_exact() {
        let err = resolve_plugins(&[
            RawPlugin::new("com.android.application"),
            RawPlugin::new("com.android.application").with_version("8.7.0"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicatePlugin {
                id: "com.android.application".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_through_alias() {
        let err = resolve_plugins(&[
            RawPlugin::new("kotlin-android"),
            RawPlugin::new("org.jetbrains.kotlin.android"),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::DuplicatePlugin);
    }

    #[test]
    fn test_pinned_version_is_exact() {
        let plugin =
            PluginRef::from_raw(&RawPlugin::new("com.android.application").with_version("8.7.0"))
                .unwrap();
        let version = plugin.version().unwrap();
        assert_eq!(version.as_str(), "8.7.0");
        assert_eq!(version.matches(&Version::new(8, 7, 0)), Some(true));
        assert_eq!(version.matches(&Version::new(8, 9, 3)), Some(false));

        let json = serde_json::to_value(&plugin).unwrap();
        assert_eq!(json["version"], "8.7.0");
    }

    #[test]
    fn test_prefix_version() {
        let version = PluginVersion::parse("1.+").unwrap();
        assert_eq!(version.to_string(), "1.+");
        assert_eq!(version.matches(&Version::new(1, 9, 0)), Some(true));
        assert_eq!(version.matches(&Version::new(2, 0, 0)), Some(false));
        assert_eq!(PluginVersion::parse("+").unwrap().matches(&Version::new(3, 1, 4)), Some(true));
    }

    #[test]
    fn test_gradle_only_notations_are_opaque() {
        for text in ["1.0.0.RELEASE", "[1.0,2.0)", "latest.release"] {
            let plugin = PluginRef::from_raw(&RawPlugin::new("x").with_version(text)).unwrap();
            let version = plugin.version().unwrap();
            assert_eq!(version.as_str(), text);
            assert!(version.requirement().is_none(), "{text}");
        }
    }

    #[test]
    fn test_invalid_version_constraint() {
        for text in ["", "1.0 beta"] {
            let err = PluginRef::from_raw(&RawPlugin::new("x").with_version(text)).unwrap_err();
            assert_eq!(err.kind(), ValidationErrorKind::InvalidPluginVersion);
        }
    }
}
