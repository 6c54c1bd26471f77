//! Resolver and document errors

use buildcfg_core::error::{Error as CoreError, ErrorCode};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Why a resolution pass failed. Every variant names the offending
/// field, plugin or build type.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// A field inherits a key no provider knows
    #[error("`{field}` inherits `{key}` but no default provides it")]
    UnresolvedDefault {
        /// Document field being resolved
        field: &'static str,
        /// Symbolic key it inherits
        key: String,
    },

    /// A provider knows the key but its value has the wrong type
    #[error("default `{key}` for `{field}` is not {expected}: {value:?}")]
    InvalidDefault {
        /// Document field being resolved
        field: &'static str,
        /// Symbolic key it inherits
        key: String,
        /// Value the provider returned
        value: String,
        /// What the field needs, e.g. "an integer"
        expected: &'static str,
    },

    /// `minSdk <= targetSdk <= compileSdk` is violated
    #[error(
        "SDK levels out of order: minSdk {min_sdk} <= targetSdk {target_sdk} <= compileSdk {compile_sdk} does not hold"
    )]
    InconsistentSdkLevels {
        /// Resolved `minSdk`
        min_sdk: u32,
        /// Resolved `targetSdk`
        target_sdk: u32,
        /// Resolved `compileSdk`
        compile_sdk: u32,
    },

    /// A build type names a signing config the registry lacks
    #[error("build type `{build_type}` references unknown signing config `{signing_config}`")]
    UnknownSigningConfig {
        /// Build type name
        build_type: String,
        /// Name it references
        signing_config: String,
    },

    /// The same plugin id appears twice
    #[error("plugin `{id}` is applied more than once")]
    DuplicatePlugin {
        /// Canonical plugin id
        id: String,
    },

    /// A plugin version notation is malformed
    #[error("plugin `{id}` has invalid version constraint `{constraint}`: {reason}")]
    InvalidPluginVersion {
        /// Plugin id
        id: String,
        /// Version text as written
        constraint: String,
        /// Why it was rejected
        reason: String,
    },

    /// A required field has no value
    #[error("required field `{field}` is not set")]
    MissingField {
        /// Document field name
        field: &'static str,
    },
}

/// Discriminant of a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorKind {
    /// See [`ValidationError::UnresolvedDefault`]
    UnresolvedDefault,
    /// See [`ValidationError::InvalidDefault`]
    InvalidDefault,
    /// See [`ValidationError::InconsistentSdkLevels`]
    InconsistentSdkLevels,
    /// See [`ValidationError::UnknownSigningConfig`]
    UnknownSigningConfig,
    /// See [`ValidationError::DuplicatePlugin`]
    DuplicatePlugin,
    /// See [`ValidationError::InvalidPluginVersion`]
    InvalidPluginVersion,
    /// See [`ValidationError::MissingField`]
    MissingField,
}

impl ValidationError {
    /// The error's kind, for matching without destructuring
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::UnresolvedDefault { .. } => ValidationErrorKind::UnresolvedDefault,
            Self::InvalidDefault { .. } => ValidationErrorKind::InvalidDefault,
            Self::InconsistentSdkLevels { .. } => ValidationErrorKind::InconsistentSdkLevels,
            Self::UnknownSigningConfig { .. } => ValidationErrorKind::UnknownSigningConfig,
            Self::DuplicatePlugin { .. } => ValidationErrorKind::DuplicatePlugin,
            Self::InvalidPluginVersion { .. } => ValidationErrorKind::InvalidPluginVersion,
            Self::MissingField { .. } => ValidationErrorKind::MissingField,
        }
    }

    fn code(&self) -> ErrorCode {
        match self.kind() {
            ValidationErrorKind::UnresolvedDefault => ErrorCode::UnresolvedDefault,
            ValidationErrorKind::InvalidDefault => ErrorCode::InvalidDefault,
            ValidationErrorKind::InconsistentSdkLevels => ErrorCode::InconsistentSdkLevels,
            ValidationErrorKind::UnknownSigningConfig => ErrorCode::UnknownSigningConfig,
            ValidationErrorKind::DuplicatePlugin => ErrorCode::DuplicatePlugin,
            ValidationErrorKind::InvalidPluginVersion => ErrorCode::InvalidPluginVersion,
            ValidationErrorKind::MissingField => ErrorCode::MissingField,
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnresolvedDefault { key, .. } => Some(format!(
                "Set `{key}` in local.properties or under [toolchain.overrides] in .buildcfg.toml"
            )),
            Self::UnknownSigningConfig { signing_config, .. } => Some(format!(
                "Declare [signing.{signing_config}] in .buildcfg.toml"
            )),
            Self::DuplicatePlugin { .. } => {
                Some("Remove the repeated entry from the plugins block".to_string())
            }
            Self::InconsistentSdkLevels { .. } => {
                Some("Raise targetSdk/compileSdk or lower minSdk".to_string())
            }
            _ => None,
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        let mut core = CoreError::new(err.code(), err.to_string());
        if let Some(suggestion) = err.suggestion() {
            core = core.with_suggestion(suggestion);
        }
        core.with_source(err)
    }
}

/// Errors raised while reading a raw document from disk or text
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The extension maps to no known format
    #[error("unsupported document format: {0} (expected .kts, .gradle, .toml or .json)")]
    UnsupportedFormat(PathBuf),

    /// The Gradle script could not be parsed
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A build type block closes without a `signingConfig`
    #[error("line {line}: build type `{build_type}` sets no signingConfig")]
    MissingSigningConfig {
        /// Line of the build type's opening brace
        line: usize,
        /// Build type name
        build_type: String,
    },

    /// Malformed TOML document
    #[error("TOML document error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON document
    #[error("JSON document error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

impl From<DocumentError> for CoreError {
    fn from(err: DocumentError) -> Self {
        let code = match &err {
            DocumentError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::FileNotFound
            }
            DocumentError::Io { .. } => ErrorCode::IoError,
            DocumentError::UnsupportedFormat(_) => ErrorCode::UnsupportedFormat,
            DocumentError::MissingSigningConfig { .. } => ErrorCode::MissingSigningConfig,
            _ => ErrorCode::DocumentParseError,
        };
        let mut core = CoreError::new(code, err.to_string());
        if let DocumentError::MissingSigningConfig { build_type, .. } = &err {
            core = core.with_suggestion(format!(
                "Add `signingConfig = signingConfigs.getByName(\"...\")` to the {build_type} build type"
            ));
        }
        core.with_source(err)
    }
}
