//! Configuration schema definitions
//!
//! Mirrors the sections of `.buildcfg.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    /// `[general]`: document and properties locations
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[toolchain]`: preset and overrides
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// `[signing.<name>]` entries; only `debug` when the file has no `[signing]` table
    #[serde(default = "default_signing")]
    pub signing: BTreeMap<String, SigningEntry>,

    /// `[lint]` thresholds
    #[serde(default)]
    pub lint: LintConfig,
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            toolchain: ToolchainConfig::default(),
            signing: default_signing(),
            lint: LintConfig::default(),
        }
    }
}

/// Document locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Module build document resolved when no path is given on the command line
    #[serde(default = "default_document")]
    pub document: String,

    /// Properties file holding version code/name defaults
    #[serde(default = "default_local_properties")]
    pub local_properties: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            document: default_document(),
            local_properties: default_local_properties(),
        }
    }
}

fn default_document() -> String {
    "android/app/build.gradle.kts".to_string()
}

fn default_local_properties() -> String {
    "android/local.properties".to_string()
}

/// Which toolchain supplies inherited values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainPreset {
    /// Flutter's gradle plugin defaults
    #[default]
    Flutter,
    /// No built-in defaults; only overrides and properties apply
    None,
}

/// Toolchain defaults configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolchainConfig {
    /// Built-in defaults preset
    #[serde(default)]
    pub preset: ToolchainPreset,

    /// Values that take precedence over the preset, keyed by dotted name.
    /// Nested tables flatten, so `[toolchain.overrides.flutter] minSdkVersion = 23`
    /// sets `flutter.minSdkVersion`.
    #[serde(default)]
    pub overrides: toml::Table,
}

/// A named signing configuration. Key material is never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SigningEntry {
    /// Keystore path; `~` and environment variables are expanded
    #[serde(default)]
    pub store_file: Option<String>,

    /// Key alias inside the keystore
    #[serde(default)]
    pub key_alias: Option<String>,
}

fn default_signing() -> BTreeMap<String, SigningEntry> {
    let mut signing = BTreeMap::new();
    signing.insert(
        "debug".to_string(),
        SigningEntry {
            store_file: Some("~/.android/debug.keystore".to_string()),
            key_alias: Some("androiddebugkey".to_string()),
        },
    );
    signing
}

/// Descriptor lint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Lowest targetSdk accepted by the app store, if any
    #[serde(default = "default_min_target_sdk")]
    pub min_target_sdk: Option<u32>,

    /// Warn when targetSdk is below compileSdk
    #[serde(default = "default_true")]
    pub warn_target_lag: bool,

    /// Warn when a release build signs with the debug key
    #[serde(default = "default_true")]
    pub warn_debug_signed_release: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            min_target_sdk: default_min_target_sdk(),
            warn_target_lag: true,
            warn_debug_signed_release: true,
        }
    }
}

fn default_min_target_sdk() -> Option<u32> {
    Some(35)
}

fn default_true() -> bool {
    true
}
