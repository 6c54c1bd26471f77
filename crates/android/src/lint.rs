//! Advisory checks on a resolved descriptor
//!
//! Resolution already guarantees the structural invariants. Lint covers
//! what the store or the toolchain will reject later, and flags choices
//! that are legal but usually unintended.

use crate::descriptor::BuildDescriptor;
use buildcfg_core::config::LintConfig;
use buildcfg_core::validation::{ValidationResult, Validator};

/// Dotted Java package name with at least two segments
const APPLICATION_ID_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$";

/// Highest versionCode the Play Store accepts
pub const MAX_VERSION_CODE: u32 = 2_100_000_000;

/// Run every check against `descriptor`
pub fn lint(descriptor: &BuildDescriptor, config: &LintConfig) -> ValidationResult {
    let source = descriptor.source_compatibility();
    let target = descriptor.target_compatibility();

    let mut validator = Validator::new()
        .pattern(
            "applicationId",
            descriptor.application_id(),
            APPLICATION_ID_PATTERN,
            "a dotted package name such as com.example.app",
        )
        .required("versionName", descriptor.version_name())
        .range("versionCode", descriptor.version_code(), 1, MAX_VERSION_CODE)
        .custom("compileOptions", || {
            (source > target).then(|| {
                format!("sourceCompatibility {source} is newer than targetCompatibility {target}")
            })
        });

    if config.warn_target_lag {
        validator = validator.warn_if(
            "targetSdk",
            descriptor.target_sdk() < descriptor.compile_sdk(),
            &format!(
                "targetSdk {} is below compileSdk {}; confirm this is intended",
                descriptor.target_sdk(),
                descriptor.compile_sdk()
            ),
        );
    }

    if let Some(floor) = config.min_target_sdk {
        validator = validator.warn_if(
            "targetSdk",
            descriptor.target_sdk() < floor,
            &format!(
                "targetSdk {} is below the store minimum of {floor}",
                descriptor.target_sdk()
            ),
        );
    }

    if config.warn_debug_signed_release {
        let debug_signed = descriptor
            .build_type("release")
            .is_some_and(|release| release.signing_config_ref() == "debug");
        validator = validator.warn_if(
            "buildTypes.release",
            debug_signed,
            "release build is signed with the debug key",
        );
    }

    if let Some(jvm_target) = descriptor.jvm_target() {
        validator = validator.warn_if(
            "kotlinOptions.jvmTarget",
            jvm_target != target.to_string(),
            &format!("jvmTarget {jvm_target} differs from targetCompatibility {target}"),
        );
    }

    let result = validator.validate();
    tracing::debug!(
        errors = result.errors().len(),
        warnings = result.warnings().len(),
        "Linted build descriptor"
    );
    result
}
