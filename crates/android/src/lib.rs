//! Android module configuration resolver
//!
//! Turns a declarative module document (a `build.gradle.kts`, or the same
//! fields in TOML/JSON) into a validated, read-only [`BuildDescriptor`]:
//!
//! - Gradle module script reading
//! - Toolchain defaults for inherited values (`flutter.minSdkVersion`, ...)
//! - Signing config and plugin checks
//! - Advisory lint on the result
//!
//! # Example
//!
//! ```rust
//! use buildcfg_android::{resolve, RawDocument, DocumentFormat, SigningConfig, SigningRegistry, ToolchainDefaults};
//!
//! let doc = RawDocument::parse(
//!     r#"
//!     android {
//!         compileSdk = 36
//!         defaultConfig {
//!             applicationId = "com.example.app"
//!             minSdk = flutter.minSdkVersion
//!             targetSdk = 35
//!             versionCode = 1
//!             versionName = "1.0"
//!         }
//!     }
//!     "#,
//!     DocumentFormat::Gradle,
//! )
//! .unwrap();
//!
//! let registry = SigningRegistry::new().with(SigningConfig::new("debug"));
//! let descriptor = resolve(&doc, &ToolchainDefaults::flutter(), &registry).unwrap();
//! assert_eq!(descriptor.min_sdk(), 24);
//! ```

#![warn(missing_docs)]

/// Toolchain default providers
pub mod defaults;
/// Resolved build descriptor
pub mod descriptor;
/// Unresolved module documents
pub mod document;
/// Resolver and document errors
pub mod error;
/// Gradle Kotlin DSL reader
pub mod gradle;
/// Java compatibility levels
pub mod java;
/// Descriptor lint rules
pub mod lint;
/// Plugin references
pub mod plugin;
/// Document resolution
pub mod resolver;
/// Literal or inherited values
pub mod setting;
/// Signing config registry
pub mod signing;

pub use defaults::{DefaultValue, DefaultsProvider, LayeredDefaults, PropertiesDefaults, ToolchainDefaults};
pub use descriptor::{BuildDescriptor, BuildTypeConfig};
pub use document::{DocumentFormat, RawDocument};
pub use error::{DocumentError, ValidationError, ValidationErrorKind};
pub use java::JavaVersion;
pub use plugin::{PluginRef, PluginVersion};
pub use resolver::resolve;
pub use setting::Setting;
pub use signing::{SigningConfig, SigningRegistry};
