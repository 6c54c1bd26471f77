//! The resolved, read-only build descriptor handed to packaging

use crate::java::JavaVersion;
use crate::plugin::PluginRef;
use crate::signing::SigningConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Packaging rules for one build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTypeConfig {
    signing_config_ref: String,
    signing: SigningConfig,
}

impl BuildTypeConfig {
    pub(crate) fn new(signing: SigningConfig) -> Self {
        Self {
            signing_config_ref: signing.name().to_string(),
            signing,
        }
    }

    /// Name of the signing config this build type uses
    pub fn signing_config_ref(&self) -> &str {
        &self.signing_config_ref
    }

    /// The registry handle the reference resolved to
    pub fn signing(&self) -> &SigningConfig {
        &self.signing
    }
}

/// Fully resolved module configuration.
///
/// Built once by [`crate::resolve`]; every field is concrete and the
/// invariants `minSdk <= targetSdk <= compileSdk`, unique plugin ids and
/// known signing configs hold. There are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDescriptor {
    pub(crate) application_id: String,
    pub(crate) namespace: String,
    pub(crate) compile_sdk: u32,
    pub(crate) min_sdk: u32,
    pub(crate) target_sdk: u32,
    pub(crate) version_code: u32,
    pub(crate) version_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ndk_version: Option<String>,
    pub(crate) source_compatibility: JavaVersion,
    pub(crate) target_compatibility: JavaVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) jvm_target: Option<String>,
    pub(crate) plugins: Vec<PluginRef>,
    pub(crate) build_types: BTreeMap<String, BuildTypeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) flutter_source: Option<PathBuf>,
}

impl BuildDescriptor {
    /// Package name the app is published under
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Code namespace; the application id when the document sets none
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// API level compiled against
    pub fn compile_sdk(&self) -> u32 {
        self.compile_sdk
    }

    /// Lowest API level the app installs on
    pub fn min_sdk(&self) -> u32 {
        self.min_sdk
    }

    /// API level the app is tested against
    pub fn target_sdk(&self) -> u32 {
        self.target_sdk
    }

    /// Monotonic store version
    pub fn version_code(&self) -> u32 {
        self.version_code
    }

    /// User-facing version string
    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    /// Pinned NDK, if any
    pub fn ndk_version(&self) -> Option<&str> {
        self.ndk_version.as_deref()
    }

    /// Java language level for sources
    pub fn source_compatibility(&self) -> JavaVersion {
        self.source_compatibility
    }

    /// Java bytecode level
    pub fn target_compatibility(&self) -> JavaVersion {
        self.target_compatibility
    }

    /// Kotlin `jvmTarget`, if set
    pub fn jvm_target(&self) -> Option<&str> {
        self.jvm_target.as_deref()
    }

    /// Applied plugins in document order
    pub fn plugins(&self) -> &[PluginRef] {
        &self.plugins
    }

    /// Whether `id` (or its canonical alias) is applied
    pub fn has_plugin(&self, id: &str) -> bool {
        let id = crate::plugin::canonical_id(id);
        self.plugins.iter().any(|p| p.id() == id)
    }

    /// Build types keyed by name
    pub fn build_types(&self) -> &BTreeMap<String, BuildTypeConfig> {
        &self.build_types
    }

    /// Look up one build type
    pub fn build_type(&self, name: &str) -> Option<&BuildTypeConfig> {
        self.build_types.get(name)
    }

    /// Framework source directory from the `flutter { }` block
    pub fn flutter_source(&self) -> Option<&Path> {
        self.flutter_source.as_deref()
    }
}
