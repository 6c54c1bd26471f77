//! Raw module document, as written before resolution
//!
//! Field names follow the Gradle DSL (`applicationId`, `minSdk`, ...) so a
//! TOML or JSON document reads like the `android { }` block it stands in for.

use crate::error::DocumentError;
use crate::gradle;
use crate::java::JavaVersion;
use crate::setting::Setting;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Unresolved module configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawDocument {
    /// `plugins { }` entries in order
    #[serde(default)]
    pub plugins: Vec<RawPlugin>,
    /// Code namespace
    #[serde(default)]
    pub namespace: Option<String>,
    /// `defaultConfig.applicationId`
    #[serde(default)]
    pub application_id: Option<String>,
    /// `compileSdk`
    #[serde(default)]
    pub compile_sdk: Option<Setting<u32>>,
    /// `defaultConfig.minSdk`
    #[serde(default)]
    pub min_sdk: Option<Setting<u32>>,
    /// `defaultConfig.targetSdk`
    #[serde(default)]
    pub target_sdk: Option<Setting<u32>>,
    /// `ndkVersion`
    #[serde(default)]
    pub ndk_version: Option<Setting<String>>,
    /// `defaultConfig.versionCode`
    #[serde(default)]
    pub version_code: Option<Setting<u32>>,
    /// `defaultConfig.versionName`
    #[serde(default)]
    pub version_name: Option<Setting<String>>,
    /// `compileOptions { }`
    #[serde(default)]
    pub compile_options: CompileOptions,
    /// `kotlinOptions { }`
    #[serde(default)]
    pub kotlin_options: KotlinOptions,
    /// `buildTypes { }` keyed by name
    #[serde(default)]
    pub build_types: BTreeMap<String, RawBuildType>,
    /// `flutter { }`, when present
    #[serde(default)]
    pub flutter: Option<FlutterBlock>,
}

/// A `plugins { }` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlugin {
    /// Plugin id as written
    pub id: String,
    /// Version notation, unparsed
    #[serde(default)]
    pub version: Option<String>,
}

impl RawPlugin {
    /// Plugin without a version
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
        }
    }

    /// Attach a version notation
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// The `compileOptions { }` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// `sourceCompatibility`
    #[serde(default)]
    pub source_compatibility: Option<JavaVersion>,
    /// `targetCompatibility`; follows the source level when unset
    #[serde(default)]
    pub target_compatibility: Option<JavaVersion>,
}

/// The `kotlinOptions { }` block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KotlinOptions {
    /// `jvmTarget`
    #[serde(default)]
    pub jvm_target: Option<String>,
}

/// A `buildTypes { name { } }` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuildType {
    /// Name passed to `signingConfigs.getByName`
    #[serde(alias = "signingConfigRef")]
    pub signing_config: String,
}

impl RawBuildType {
    /// Build type signed with the named config
    pub fn signed_with(signing_config: impl Into<String>) -> Self {
        Self {
            signing_config: signing_config.into(),
        }
    }
}

/// The `flutter { }` block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlutterBlock {
    /// Framework source directory
    #[serde(default)]
    pub source: Option<PathBuf>,
}

/// On-disk encodings a document can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Gradle Kotlin DSL (`build.gradle.kts`) or Groovy-free `.gradle` subset
    Gradle,
    /// TOML document (`.toml`)
    Toml,
    /// JSON document (`.json`)
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "kts" | "gradle" => Some(Self::Gradle),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl RawDocument {
    /// Parse a document from text in the given format
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, DocumentError> {
        match format {
            DocumentFormat::Gradle => gradle::parse(text),
            DocumentFormat::Toml => Ok(toml::from_str(text)?),
            DocumentFormat::Json => Ok(serde_json::from_str(text)?),
        }
    }

    /// Read and parse a document, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| DocumentError::UnsupportedFormat(path.to_path_buf()))?;
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?format, "Loading module document");
        Self::parse(&text, format)
    }
}
