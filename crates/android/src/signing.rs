//! Signing configuration registry
//!
//! Build types name a signing config; the registry maps those names to
//! opaque handles. Keystores are referenced by path only and never opened.

use buildcfg_core::config::SigningEntry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Opaque handle for a named signing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_alias: Option<String>,
}

impl SigningConfig {
    /// Handle with no keystore details
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_file: None,
            key_alias: None,
        }
    }

    /// Set the keystore path
    pub fn with_store_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_file = Some(path.into());
        self
    }

    /// Set the key alias
    pub fn with_key_alias(mut self, alias: impl Into<String>) -> Self {
        self.key_alias = Some(alias.into());
        self
    }

    /// Config name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keystore path, expanded
    pub fn store_file(&self) -> Option<&PathBuf> {
        self.store_file.as_ref()
    }

    /// Key alias
    pub fn key_alias(&self) -> Option<&str> {
        self.key_alias.as_deref()
    }

    /// Build a handle from a `[signing.<name>]` config entry, expanding `~`
    /// and environment variables in the store path. Unset variables leave
    /// the path as written.
    pub fn from_entry(name: &str, entry: &SigningEntry) -> Self {
        let mut config = Self::new(name);
        if let Some(store) = &entry.store_file {
            let expanded = match shellexpand::full(store) {
                Ok(path) => path.into_owned(),
                Err(e) => {
                    tracing::warn!(signing = name, error = %e, "Could not expand store_file");
                    store.clone()
                }
            };
            config = config.with_store_file(expanded);
        }
        if let Some(alias) = &entry.key_alias {
            config = config.with_key_alias(alias);
        }
        config
    }
}

/// Known signing configurations, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningRegistry {
    configs: BTreeMap<String, SigningConfig>,
}

impl SigningRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a config under its own name, replacing any previous one
    pub fn insert(&mut self, config: SigningConfig) {
        self.configs.insert(config.name.clone(), config);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, config: SigningConfig) -> Self {
        self.insert(config);
        self
    }

    /// Look up a config by name
    pub fn get(&self, name: &str) -> Option<&SigningConfig> {
        self.configs.get(name)
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    /// Number of configs
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Build the registry declared in `.buildcfg.toml`
    pub fn from_entries(entries: &BTreeMap<String, SigningEntry>) -> Self {
        entries
            .iter()
            .map(|(name, entry)| SigningConfig::from_entry(name, entry))
            .fold(Self::new(), Self::with)
    }
}
