//! CLI smoke tests for buildcfg.
//!
//! Each test runs the binary inside a scratch project laid out the way a
//! Flutter app is (`android/app/build.gradle.kts`, `android/local.properties`).

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MODULE: &str = r#"
plugins {
    id("com.android.application")
    id("kotlin-android")
    id("dev.flutter.flutter-gradle-plugin")
}

android {
    namespace = "com.example.exchange_mobile"
    compileSdk = 36
    ndkVersion = flutter.ndkVersion

    defaultConfig {
        applicationId = "com.example.exchange_mobile"
        minSdk = flutter.minSdkVersion
        targetSdk = 33
        versionCode = flutter.versionCode
        versionName = flutter.versionName
    }

    buildTypes {
        release {
            signingConfig = signingConfigs.getByName("debug")
        }
    }
}
"#;

const LOCAL_PROPERTIES: &str = "flutter.versionName=1.0.0\nflutter.versionCode=1\n";

fn buildcfg(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("buildcfg").unwrap();
    cmd.current_dir(project.path()).arg("--no-color");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Scratch project with the module script and its properties file
fn project(module: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("android/app");
    std::fs::create_dir_all(&app).unwrap();
    std::fs::write(app.join("build.gradle.kts"), module).unwrap();
    std::fs::write(temp.path().join("android/local.properties"), LOCAL_PROPERTIES).unwrap();
    temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
    let temp = TempDir::new().unwrap();
    buildcfg(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn version_flag_works() {
    let temp = TempDir::new().unwrap();
    buildcfg(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("buildcfg"));
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_default_layout_as_json() {
    let temp = project(MODULE);
    let output = buildcfg(&temp)
        .args(["resolve", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["applicationId"], "com.example.exchange_mobile");
    assert_eq!(json["minSdk"], 24);
    assert_eq!(json["targetSdk"], 33);
    assert_eq!(json["compileSdk"], 36);
    assert_eq!(json["versionCode"], 1);
    assert_eq!(json["versionName"], "1.0.0");
    assert_eq!(json["ndkVersion"], "27.0.12077973");
}

#[test]
fn resolve_prints_fields() {
    let temp = project(MODULE);
    buildcfg(&temp)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.exchange_mobile"))
        .stdout(predicate::str::contains("minSdk"))
        .stdout(predicate::str::contains("signed with debug"));
}

#[test]
fn resolve_explicit_document_and_properties() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("module.gradle.kts"), MODULE).unwrap();
    std::fs::write(temp.path().join("values.properties"), LOCAL_PROPERTIES).unwrap();

    buildcfg(&temp)
        .args([
            "resolve",
            "module.gradle.kts",
            "--json",
            "--local-properties",
            "values.properties",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"minSdk\": 24"));
}

#[test]
fn resolve_uses_config_overrides() {
    let temp = project(MODULE);
    std::fs::write(
        temp.path().join(".buildcfg.toml"),
        "[toolchain.overrides.flutter]\nminSdkVersion = 26\n",
    )
    .unwrap();

    buildcfg(&temp)
        .args(["resolve", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"minSdk\": 26"));
}

#[test]
fn resolve_without_properties_is_validation_error() {
    let temp = project(MODULE);
    std::fs::remove_file(temp.path().join("android/local.properties")).unwrap();

    buildcfg(&temp)
        .arg("resolve")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E6001"))
        .stderr(predicate::str::contains("flutter.versionCode"));
}

#[test]
fn resolve_unknown_signing_config() {
    let temp = project(&MODULE.replace(
        r#"getByName("debug")"#,
        r#"getByName("release-key")"#,
    ));

    buildcfg(&temp)
        .arg("resolve")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("release-key"));
}

#[test]
fn resolve_signing_config_from_config_file() {
    let temp = project(&MODULE.replace(
        r#"getByName("debug")"#,
        r#"getByName("upload")"#,
    ));
    std::fs::write(
        temp.path().join(".buildcfg.toml"),
        "[signing.upload]\nstore_file = \"/keys/upload.jks\"\nkey_alias = \"upload\"\n",
    )
    .unwrap();

    buildcfg(&temp)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("signed with upload"));
}

#[test]
fn resolve_syntax_error_is_document_error() {
    let temp = project("android {\n    compileSdk = 36\n");

    buildcfg(&temp)
        .arg("resolve")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("E3003"));
}

#[test]
fn resolve_json_failure_is_error_report() {
    let temp = project(&MODULE.replace(
        r#"getByName("debug")"#,
        r#"getByName("release-key")"#,
    ));
    let output = buildcfg(&temp)
        .args(["resolve", "--json"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["code"], "UNKNOWN_SIGNING_CONFIG");
    assert_eq!(report["code_str"], "E6004");
    assert_eq!(report["category"], "Validation");
    assert!(report["message"].as_str().unwrap().contains("release-key"));
    assert!(report["suggestion"].as_str().unwrap().contains("[signing.release-key]"));
}

#[test]
fn resolve_unsigned_release_names_the_build_type() {
    let temp = project(&MODULE.replace(
        r#"signingConfig = signingConfigs.getByName("debug")"#,
        "isMinifyEnabled = true",
    ));

    buildcfg(&temp)
        .arg("resolve")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("E3005"))
        .stderr(predicate::str::contains("`release` sets no signingConfig"));
}

#[test]
fn resolve_missing_document_fails() {
    let temp = TempDir::new().unwrap();
    buildcfg(&temp)
        .args(["resolve", "missing.gradle.kts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.gradle.kts"));
}

#[test]
fn missing_explicit_config_is_config_error() {
    let temp = project(MODULE);
    buildcfg(&temp)
        .args(["--config", "nope.toml", "resolve"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("E3001"));
}

// =============================================================================
// check
// =============================================================================

#[test]
fn check_reports_warnings_and_passes() {
    let temp = project(MODULE);
    buildcfg(&temp)
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("targetSdk"))
        .stderr(predicate::str::contains("debug key"))
        .stdout(predicate::str::contains("0 errors, 3 warnings"));
}

#[test]
fn check_lint_error_fails() {
    let temp = project(&MODULE.replace(
        r#"applicationId = "com.example.exchange_mobile""#,
        r#"applicationId = "exchange-mobile""#,
    ));

    buildcfg(&temp)
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E6000"))
        .stderr(predicate::str::contains("applicationId"));
}

#[test]
fn check_strict_fails_on_warnings() {
    let temp = project(MODULE);
    buildcfg(&temp)
        .args(["check", "--strict"])
        .assert()
        .code(2);
}

#[test]
fn check_respects_lint_config() {
    let temp = project(MODULE);
    std::fs::write(
        temp.path().join(".buildcfg.toml"),
        "[lint]\nmin_target_sdk = 33\nwarn_target_lag = false\nwarn_debug_signed_release = false\n",
    )
    .unwrap();

    buildcfg(&temp)
        .args(["check", "--strict"])
        .assert()
        .success();
}

// =============================================================================
// defaults
// =============================================================================

#[test]
fn defaults_lists_sources() {
    let temp = project(MODULE);
    let output = buildcfg(&temp)
        .args(["defaults", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let entries: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    let min_sdk = entries
        .iter()
        .find(|e| e["key"] == "flutter.minSdkVersion")
        .unwrap();
    assert_eq!(min_sdk["value"], 24);
    assert_eq!(min_sdk["source"], "flutter");

    let version = entries
        .iter()
        .find(|e| e["key"] == "flutter.versionName")
        .unwrap();
    assert_eq!(version["source"], "local.properties");
}

#[test]
fn defaults_with_no_preset_is_empty() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("buildcfg.toml"),
        "[toolchain]\npreset = \"none\"\n",
    )
    .unwrap();

    buildcfg(&temp)
        .arg("defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("No defaults configured"));
}
