//! Toolchain defaults providers
//!
//! A document can defer a value to its toolchain with a symbolic key such as
//! `flutter.minSdkVersion`. Providers map those keys to concrete values:
//!
//! - [`ToolchainDefaults`]: a flat key map, with a built-in Flutter preset
//!   and TOML loading
//! - [`PropertiesDefaults`]: a Java `.properties` file such as
//!   `local.properties`, where Flutter writes `flutter.versionCode`
//! - [`LayeredDefaults`]: an ordered stack where the first hit wins

use crate::error::DocumentError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A value supplied by a defaults provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// Integer value (SDK levels, version codes)
    Int(i64),
    /// Anything that does not parse as an integer
    Text(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for DefaultValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for DefaultValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for DefaultValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for DefaultValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Supplies values for inherited document fields
pub trait DefaultsProvider {
    /// Look up a symbolic key
    fn lookup(&self, key: &str) -> Option<DefaultValue>;

    /// Every key this provider can answer, with its value, for display
    fn entries(&self) -> Vec<(String, DefaultValue)> {
        Vec::new()
    }
}

impl<T: DefaultsProvider + ?Sized> DefaultsProvider for &T {
    fn lookup(&self, key: &str) -> Option<DefaultValue> {
        (**self).lookup(key)
    }

    fn entries(&self) -> Vec<(String, DefaultValue)> {
        (**self).entries()
    }
}

impl<T: DefaultsProvider + ?Sized> DefaultsProvider for Box<T> {
    fn lookup(&self, key: &str) -> Option<DefaultValue> {
        (**self).lookup(key)
    }

    fn entries(&self) -> Vec<(String, DefaultValue)> {
        (**self).entries()
    }
}

impl DefaultsProvider for BTreeMap<String, DefaultValue> {
    fn lookup(&self, key: &str) -> Option<DefaultValue> {
        self.get(key).cloned()
    }

    fn entries(&self) -> Vec<(String, DefaultValue)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Flat key map of toolchain values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainDefaults {
    values: BTreeMap<String, DefaultValue>,
}

impl ToolchainDefaults {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Values the Flutter gradle plugin exposes on its `flutter` extension.
    /// `versionCode`/`versionName` are absent; Flutter reads those from
    /// `local.properties`.
    pub fn flutter() -> Self {
        Self::new()
            .with("flutter.compileSdkVersion", 36)
            .with("flutter.targetSdkVersion", 36)
            .with("flutter.minSdkVersion", 24)
            .with("flutter.ndkVersion", "27.0.12077973")
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DefaultValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DefaultValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no keys are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from a TOML table. Nested tables flatten to dotted keys, so
    /// `[flutter] minSdkVersion = 23` yields `flutter.minSdkVersion`.
    /// Values that are neither integers nor strings are skipped.
    pub fn from_toml_table(table: &toml::Table) -> Self {
        let mut defaults = Self::new();
        flatten_into(&mut defaults, "", table);
        defaults
    }

    /// Parse TOML text, see [`ToolchainDefaults::from_toml_table`]
    pub fn from_toml_str(text: &str) -> Result<Self, DocumentError> {
        let table: toml::Table = toml::from_str(text)?;
        Ok(Self::from_toml_table(&table))
    }
}

fn flatten_into(defaults: &mut ToolchainDefaults, prefix: &str, table: &toml::Table) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten_into(defaults, &full, nested),
            toml::Value::Integer(n) => defaults.insert(full, *n),
            toml::Value::String(s) => defaults.insert(full, s.as_str()),
            other => {
                tracing::debug!(key = %full, kind = other.type_str(), "Ignoring non-scalar default")
            }
        }
    }
}

impl DefaultsProvider for ToolchainDefaults {
    fn lookup(&self, key: &str) -> Option<DefaultValue> {
        self.values.lookup(key)
    }

    fn entries(&self) -> Vec<(String, DefaultValue)> {
        self.values.entries()
    }
}

/// Values read from a Java `.properties` file
///
/// Supports `key=value`, `key: value` and `key value` lines, `#`/`!`
/// comments, blank lines, `\` line continuations and the escapes Java
/// writes (`\:`, `\\`, `\t`, `\uXXXX`, ...). Trailing whitespace of a
/// value is dropped. Every value is text; integers are parsed by the
/// resolver when a numeric field needs one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesDefaults {
    values: BTreeMap<String, DefaultValue>,
}

impl PropertiesDefaults {
    /// Parse properties text
    pub fn parse(text: &str) -> Self {
        let values = logical_lines(text)
            .iter()
            .map(|line| {
                let (key, value) = split_entry(line);
                (unescape(key), DefaultValue::Text(unescape(value.trim_end())))
            })
            .collect();
        Self { values }
    }

    /// Read and parse a properties file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let defaults = Self::parse(&text);
        tracing::debug!(path = %path.display(), count = defaults.values.len(), "Loaded properties");
        Ok(defaults)
    }
}

/// Entries with continuations joined; blank and comment lines dropped
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        if pending.is_none()
            && (trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!'))
        {
            continue;
        }

        let mut line = pending.take().unwrap_or_default();
        let backslashes = trimmed.chars().rev().take_while(|&c| c == '\\').count();
        if backslashes % 2 == 1 {
            line.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some(line);
        } else {
            line.push_str(trimmed);
            lines.push(line);
        }
    }

    if let Some(line) = pending {
        lines.push(line);
    }
    lines
}

/// Split at the first unescaped `=`, `:` or whitespace
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (at, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..at], line[at + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[at..].trim_start();
                let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
                return (&line[..at], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        chars.nth(3);
                    }
                    None => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

impl DefaultsProvider for PropertiesDefaults {
    fn lookup(&self, key: &str) -> Option<DefaultValue> {
        self.values.lookup(key)
    }

    fn entries(&self) -> Vec<(String, DefaultValue)> {
        self.values.entries()
    }
}

/// Ordered stack of providers; the first one that knows a key wins
#[derive(Default)]
pub struct LayeredDefaults<'a> {
    layers: Vec<(String, Box<dyn DefaultsProvider + 'a>)>,
}

impl<'a> LayeredDefaults<'a> {
    /// Stack with no layers
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a provider below the ones already present
    pub fn push(mut self, name: impl Into<String>, provider: impl DefaultsProvider + 'a) -> Self {
        self.layers.push((name.into(), Box::new(provider)));
        self
    }

    /// Layer names, highest precedence first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(name, _)| name.as_str())
    }

    /// The value for `key` and the name of the layer that supplied it
    pub fn lookup_with_source(&self, key: &str) -> Option<(&str, DefaultValue)> {
        self.layers
            .iter()
            .find_map(|(name, provider)| provider.lookup(key).map(|v| (name.as_str(), v)))
    }
}

impl fmt::Debug for LayeredDefaults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredDefaults")
            .field("layers", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl DefaultsProvider for LayeredDefaults<'_> {
    fn lookup(&self, key: &str) -> Option<DefaultValue> {
        self.lookup_with_source(key).map(|(_, value)| value)
    }

    /// Effective values: shadowed entries from lower layers are dropped
    fn entries(&self) -> Vec<(String, DefaultValue)> {
        let mut merged = BTreeMap::new();
        for (_, provider) in self.layers.iter().rev() {
            merged.extend(provider.entries());
        }
        merged.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flutter_preset() {
        let defaults = ToolchainDefaults::flutter();
        assert_eq!(
            defaults.lookup("flutter.minSdkVersion"),
            Some(DefaultValue::Int(24))
        );
        assert_eq!(
            defaults.lookup("flutter.ndkVersion"),
            Some(DefaultValue::Text("27.0.12077973".to_string()))
        );
        assert_eq!(defaults.lookup("flutter.versionCode"), None);
    }

    #[test]
    fn test_toml_flattening() {
        let defaults = ToolchainDefaults::from_toml_str(
            r#"
            top = 1
            [flutter]
            minSdkVersion = 23
            versionName = "2.0.0"
            enabled = true
            [flutter.nested]
            deep = "x"
            "#,
        )
        .unwrap();
        assert_eq!(defaults.lookup("top"), Some(DefaultValue::Int(1)));
        assert_eq!(defaults.lookup("flutter.minSdkVersion"), Some(DefaultValue::Int(23)));
        assert_eq!(
            defaults.lookup("flutter.nested.deep"),
            Some(DefaultValue::Text("x".to_string()))
        );
        assert_eq!(defaults.lookup("flutter.enabled"), None);
        assert_eq!(defaults.len(), 4);
    }

    #[test]
    fn test_properties_parsing() {
        let props = PropertiesDefaults::parse(
            "# generated by flutter\n\
             sdk.dir=/opt/android-sdk\n\
             flutter.versionName = 1.2.3\n\
             ! legacy comment\n\
             flutter.versionCode:7\n\
             flutter.buildMode release\n\
             \n\
             empty.key\n",
        );
        assert_eq!(
            props.lookup("sdk.dir"),
            Some(DefaultValue::Text("/opt/android-sdk".to_string()))
        );
        assert_eq!(
            props.lookup("flutter.versionName"),
            Some(DefaultValue::Text("1.2.3".to_string()))
        );
        assert_eq!(
            props.lookup("flutter.versionCode"),
            Some(DefaultValue::Text("7".to_string()))
        );
        assert_eq!(
            props.lookup("flutter.buildMode"),
            Some(DefaultValue::Text("release".to_string()))
        );
        assert_eq!(props.lookup("empty.key"), Some(DefaultValue::Text(String::new())));
        assert_eq!(props.lookup("# generated by flutter"), None);
    }

    #[test]
    fn test_properties_escapes_and_continuations() {
        let props = PropertiesDefaults::parse(concat!(
            "sdk.dir=C\\:\\\\Users\\\\dev\\\\AppData\\\\Local\\\\Android\\\\sdk\n",
            "app\\ name = Exchange\\u0020Mobile\n",
            "flutter.versionName = 1.\\\n",
            "    2.\\\n",
            "    3\n",
            "key\\=with\\:separators=tab\\there\n",
        ));
        assert_eq!(
            props.lookup("sdk.dir"),
            Some(DefaultValue::Text(r"C:\Users\dev\AppData\Local\Android\sdk".to_string()))
        );
        assert_eq!(
            props.lookup("app name"),
            Some(DefaultValue::Text("Exchange Mobile".to_string()))
        );
        assert_eq!(
            props.lookup("flutter.versionName"),
            Some(DefaultValue::Text("1.2.3".to_string()))
        );
        assert_eq!(
            props.lookup("key=with:separators"),
            Some(DefaultValue::Text("tab\there".to_string()))
        );
    }

    #[test]
    fn test_properties_load_missing_file() {
        let err = PropertiesDefaults::load(Path::new("/nonexistent/local.properties")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }

    #[test]
    fn test_layered_first_hit_wins() {
        let overrides = ToolchainDefaults::new().with("flutter.minSdkVersion", 26);
        let props = PropertiesDefaults::parse("flutter.versionCode=3");
        let layered = LayeredDefaults::new()
            .push("overrides", overrides)
            .push("local.properties", props)
            .push("flutter", ToolchainDefaults::flutter());

        assert_eq!(
            layered.lookup_with_source("flutter.minSdkVersion"),
            Some(("overrides", DefaultValue::Int(26)))
        );
        assert_eq!(
            layered.lookup_with_source("flutter.versionCode"),
            Some(("local.properties", DefaultValue::Text("3".to_string())))
        );
        assert_eq!(
            layered.lookup_with_source("flutter.compileSdkVersion"),
            Some(("flutter", DefaultValue::Int(36)))
        );
        assert_eq!(layered.lookup("missing"), None);
    }

    #[test]
    fn test_layered_entries_are_effective_values() {
        let layered = LayeredDefaults::new()
            .push("top", ToolchainDefaults::new().with("flutter.minSdkVersion", 26))
            .push("bottom", ToolchainDefaults::flutter());

        let entries: BTreeMap<String, DefaultValue> = layered.entries().into_iter().collect();
        assert_eq!(entries["flutter.minSdkVersion"], DefaultValue::Int(26));
        assert_eq!(entries["flutter.compileSdkVersion"], DefaultValue::Int(36));
    }

    #[test]
    fn test_borrowed_provider() {
        let base = ToolchainDefaults::flutter();
        let layered = LayeredDefaults::new().push("flutter", &base);
        assert_eq!(layered.lookup("flutter.targetSdkVersion"), Some(DefaultValue::Int(36)));
    }
}
