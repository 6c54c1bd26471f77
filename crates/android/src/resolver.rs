//! Single-pass resolution of a raw document into a [`BuildDescriptor`]
//!
//! Resolution is a pure function of the document, the defaults provider and
//! the signing registry. It runs in a fixed order and stops at the first
//! failure:
//!
//! 1. resolve every field, querying the defaults provider for inherited ones
//! 2. check `minSdk <= targetSdk <= compileSdk`
//! 3. resolve each build type's signing config (build type name order)
//! 4. canonicalise and deduplicate plugins
//! 5. assemble the descriptor

use crate::defaults::{DefaultValue, DefaultsProvider};
use crate::descriptor::{BuildDescriptor, BuildTypeConfig};
use crate::document::RawDocument;
use crate::error::ValidationError;
use crate::plugin::resolve_plugins;
use crate::setting::Setting;
use crate::signing::SigningRegistry;
use std::collections::BTreeMap;

/// Resolve `doc` against `defaults` and `signing`.
pub fn resolve<D>(
    doc: &RawDocument,
    defaults: &D,
    signing: &SigningRegistry,
) -> Result<BuildDescriptor, ValidationError>
where
    D: DefaultsProvider + ?Sized,
{
    let compile_sdk = int_field(doc.compile_sdk.as_ref(), "compileSdk", defaults)?;
    let min_sdk = int_field(doc.min_sdk.as_ref(), "minSdk", defaults)?;
    let target_sdk = int_field(doc.target_sdk.as_ref(), "targetSdk", defaults)?;
    let version_code = int_field(doc.version_code.as_ref(), "versionCode", defaults)?;
    let version_name = text_field(doc.version_name.as_ref(), "versionName", defaults)?;
    let ndk_version = doc
        .ndk_version
        .as_ref()
        .map(|setting| text_field(Some(setting), "ndkVersion", defaults))
        .transpose()?;

    let application_id = doc
        .application_id
        .clone()
        .or_else(|| doc.namespace.clone())
        .ok_or(ValidationError::MissingField {
            field: "applicationId",
        })?;
    let namespace = doc
        .namespace
        .clone()
        .unwrap_or_else(|| application_id.clone());

    if !(min_sdk <= target_sdk && target_sdk <= compile_sdk) {
        return Err(ValidationError::InconsistentSdkLevels {
            min_sdk,
            target_sdk,
            compile_sdk,
        });
    }

    let mut build_types = BTreeMap::new();
    for (name, build_type) in &doc.build_types {
        let handle = signing.get(&build_type.signing_config).ok_or_else(|| {
            ValidationError::UnknownSigningConfig {
                build_type: name.clone(),
                signing_config: build_type.signing_config.clone(),
            }
        })?;
        build_types.insert(name.clone(), BuildTypeConfig::new(handle.clone()));
    }

    let plugins = resolve_plugins(&doc.plugins)?;

    let source_compatibility = doc.compile_options.source_compatibility.unwrap_or_default();
    let target_compatibility = doc
        .compile_options
        .target_compatibility
        .unwrap_or(source_compatibility);

    tracing::debug!(
        application_id = %application_id,
        compile_sdk,
        min_sdk,
        target_sdk,
        build_types = build_types.len(),
        plugins = plugins.len(),
        "Resolved build descriptor"
    );

    Ok(BuildDescriptor {
        application_id,
        namespace,
        compile_sdk,
        min_sdk,
        target_sdk,
        version_code,
        version_name,
        ndk_version,
        source_compatibility,
        target_compatibility,
        jvm_target: doc.kotlin_options.jvm_target.clone(),
        plugins,
        build_types,
        flutter_source: doc.flutter.as_ref().and_then(|f| f.source.clone()),
    })
}

fn lookup<D>(key: &str, field: &'static str, defaults: &D) -> Result<DefaultValue, ValidationError>
where
    D: DefaultsProvider + ?Sized,
{
    let value = defaults
        .lookup(key)
        .ok_or_else(|| ValidationError::UnresolvedDefault {
            field,
            key: key.to_string(),
        })?;
    tracing::debug!(field, key, value = %value, "Resolved inherited value");
    Ok(value)
}

fn int_field<D>(
    setting: Option<&Setting<u32>>,
    field: &'static str,
    defaults: &D,
) -> Result<u32, ValidationError>
where
    D: DefaultsProvider + ?Sized,
{
    match setting.ok_or(ValidationError::MissingField { field })? {
        Setting::Literal(n) => Ok(*n),
        Setting::Inherited { inherit } => {
            let value = lookup(inherit, field, defaults)?;
            let parsed = match &value {
                DefaultValue::Int(n) => u32::try_from(*n).ok(),
                DefaultValue::Text(s) => s.trim().parse::<u32>().ok(),
            };
            parsed.ok_or_else(|| ValidationError::InvalidDefault {
                field,
                key: inherit.clone(),
                value: value.to_string(),
                expected: "a non-negative integer",
            })
        }
    }
}

fn text_field<D>(
    setting: Option<&Setting<String>>,
    field: &'static str,
    defaults: &D,
) -> Result<String, ValidationError>
where
    D: DefaultsProvider + ?Sized,
{
    match setting.ok_or(ValidationError::MissingField { field })? {
        Setting::Literal(s) => Ok(s.clone()),
        Setting::Inherited { inherit } => Ok(lookup(inherit, field, defaults)?.to_string()),
    }
}
