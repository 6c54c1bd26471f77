//! Gradle module build script reader
//!
//! Reads the declarative subset of `build.gradle.kts` (and the matching
//! Groovy spellings) that module scripts generated by app frameworks use:
//! nested `name { }` blocks, `key = value` assignments and the `plugins { }`
//! call forms. Anything else is skipped, since only the values that feed a
//! [`RawDocument`] matter here.

use crate::document::{RawBuildType, RawDocument, RawPlugin};
use crate::error::DocumentError;
use crate::java::JavaVersion;
use crate::setting::Setting;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.]*)\s*(?:=\s*|\s+)(.+)$").unwrap());

static PLUGIN_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(id|kotlin)\s*\(?\s*["']([^"']+)["']\s*\)?(?:\s+version\s+["']([^"']+)["'])?(?:\s+apply\s+(?:true|false))?$"#,
    )
    .unwrap()
});

static BACKTICK_PLUGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^`([^`]+)`$").unwrap());

static NAMED_CONTAINER_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:(?:getByName|create|maybeCreate|register|named)\s*\(\s*["']([^"']+)["']\s*\)|([A-Za-z_]\w*))$"#)
        .unwrap()
});

static SIGNING_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^signingConfigs(?:\.getByName\(\s*["']([^"']+)["']\s*\)|\[\s*["']([^"']+)["']\s*\]|\.([A-Za-z_]\w*))$"#,
    )
    .unwrap()
});

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

static SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)+$").unwrap());

/// A statement or block in the script tree
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Statement { text: String, line: usize },
    Block {
        header: String,
        line: usize,
        body: Vec<Node>,
    },
}

struct OpenBlock {
    header: String,
    line: usize,
    body: Vec<Node>,
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<OpenBlock>,
    current: String,
    start_line: usize,
}

impl TreeBuilder {
    fn push(&mut self, c: char, line: usize) {
        if self.current.trim().is_empty() && !c.is_whitespace() {
            self.current.clear();
            self.start_line = line;
        }
        self.current.push(c);
    }

    fn push_str(&mut self, s: &str, line: usize) {
        for c in s.chars() {
            self.push(c, line);
        }
    }

    fn body(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(block) => &mut block.body,
            None => &mut self.root,
        }
    }

    fn flush(&mut self) {
        let text = self.current.trim().to_string();
        self.current.clear();
        if !text.is_empty() {
            let line = self.start_line;
            self.body().push(Node::Statement { text, line });
        }
    }

    fn open_block(&mut self, line: usize) -> Result<(), DocumentError> {
        let header = self.current.trim().to_string();
        let start = self.start_line;
        self.current.clear();
        if header.is_empty() {
            return Err(DocumentError::syntax(line, "block `{` without a name"));
        }
        self.open.push(OpenBlock {
            header,
            line: start,
            body: Vec::new(),
        });
        Ok(())
    }

    fn close_block(&mut self, line: usize) -> Result<(), DocumentError> {
        self.flush();
        let block = self
            .open
            .pop()
            .ok_or_else(|| DocumentError::syntax(line, "unexpected `}`"))?;
        self.body().push(Node::Block {
            header: block.header,
            line: block.line,
            body: block.body,
        });
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Node>, DocumentError> {
        self.flush();
        if let Some(block) = self.open.last() {
            return Err(DocumentError::syntax(
                block.line,
                format!("block `{}` is never closed", block.header),
            ));
        }
        Ok(self.root)
    }
}

/// Split a script into a tree of blocks and statements.
fn parse_tree(text: &str) -> Result<Vec<Node>, DocumentError> {
    let mut builder = TreeBuilder::default();
    let mut chars = text.chars().peekable();
    let mut line = 1;
    let mut parens = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                let start = line;
                let mut literal = String::from(c);
                loop {
                    match chars.next() {
                        Some('\\') => {
                            literal.push('\\');
                            if let Some(escaped) = chars.next() {
                                literal.push(escaped);
                            }
                        }
                        Some(q) if q == c => {
                            literal.push(q);
                            break;
                        }
                        Some('\n') | None => {
                            return Err(DocumentError::syntax(start, "unterminated string"));
                        }
                        Some(other) => literal.push(other),
                    }
                }
                builder.push_str(&literal, start);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().is_some_and(|&next| next != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let start = line;
                chars.next();
                let mut previous = '\0';
                loop {
                    match chars.next() {
                        Some('/') if previous == '*' => break,
                        Some(next) => {
                            if next == '\n' {
                                line += 1;
                            }
                            previous = next;
                        }
                        None => {
                            return Err(DocumentError::syntax(start, "unterminated block comment"));
                        }
                    }
                }
                builder.push(' ', line);
            }
            '\n' => {
                if parens == 0 {
                    builder.flush();
                } else {
                    builder.push(' ', line);
                }
                line += 1;
            }
            ';' => builder.flush(),
            '(' => {
                parens += 1;
                builder.push(c, line);
            }
            ')' => {
                parens = parens
                    .checked_sub(1)
                    .ok_or_else(|| DocumentError::syntax(line, "unexpected `)`"))?;
                builder.push(c, line);
            }
            '{' => builder.open_block(line)?,
            '}' => builder.close_block(line)?,
            _ => builder.push(c, line),
        }
    }

    builder.finish()
}

/// Parse a module build script into a raw document.
pub fn parse(text: &str) -> Result<RawDocument, DocumentError> {
    let nodes = parse_tree(text)?;
    let mut doc = RawDocument::default();

    for node in &nodes {
        match node {
            Node::Block { header, body, .. } if header == "plugins" => {
                read_plugins(body, &mut doc)?
            }
            Node::Block { header, body, .. } if header == "android" => {
                read_android(body, &mut doc)?
            }
            Node::Block { header, body, .. } if header == "flutter" => {
                read_flutter(body, &mut doc)?
            }
            other => skip(other),
        }
    }

    Ok(doc)
}

fn skip(node: &Node) {
    match node {
        Node::Statement { text, line } => {
            tracing::debug!(line, statement = %text, "Skipping unrecognised statement")
        }
        Node::Block { header, line, .. } => {
            tracing::debug!(line, block = %header, "Skipping unrecognised block")
        }
    }
}

fn read_plugins(body: &[Node], doc: &mut RawDocument) -> Result<(), DocumentError> {
    for node in body {
        let Node::Statement { text, .. } = node else {
            skip(node);
            continue;
        };

        if let Some(caps) = PLUGIN_ID.captures(text) {
            let id = match &caps[1] {
                "kotlin" => format!("org.jetbrains.kotlin.{}", &caps[2]),
                _ => caps[2].to_string(),
            };
            let mut plugin = RawPlugin::new(id);
            if let Some(version) = caps.get(3) {
                plugin = plugin.with_version(version.as_str());
            }
            doc.plugins.push(plugin);
        } else if let Some(caps) = BACKTICK_PLUGIN.captures(text) {
            doc.plugins.push(RawPlugin::new(&caps[1]));
        } else {
            skip(node);
        }
    }
    Ok(())
}

fn read_android(body: &[Node], doc: &mut RawDocument) -> Result<(), DocumentError> {
    for node in body {
        match node {
            Node::Statement { text, line } => match assignment(text) {
                Some(("namespace", value)) => {
                    doc.namespace = Some(string_literal(value, "namespace", *line)?)
                }
                Some(("compileSdk" | "compileSdkVersion", value)) => {
                    doc.compile_sdk = Some(int_setting(value, "compileSdk", *line)?)
                }
                Some(("ndkVersion", value)) => {
                    doc.ndk_version = Some(string_setting(value, "ndkVersion", *line)?)
                }
                _ => skip(node),
            },
            Node::Block { header, body, .. } => match header.as_str() {
                "defaultConfig" => read_default_config(body, doc)?,
                "compileOptions" => read_compile_options(body, doc)?,
                "kotlinOptions" => read_kotlin_options(body, doc)?,
                "buildTypes" => read_build_types(body, doc)?,
                _ => skip(node),
            },
        }
    }
    Ok(())
}

fn read_default_config(body: &[Node], doc: &mut RawDocument) -> Result<(), DocumentError> {
    for node in body {
        let Node::Statement { text, line } = node else {
            skip(node);
            continue;
        };
        match assignment(text) {
            Some(("applicationId", value)) => {
                doc.application_id = Some(string_literal(value, "applicationId", *line)?)
            }
            Some(("minSdk" | "minSdkVersion", value)) => {
                doc.min_sdk = Some(int_setting(value, "minSdk", *line)?)
            }
            Some(("targetSdk" | "targetSdkVersion", value)) => {
                doc.target_sdk = Some(int_setting(value, "targetSdk", *line)?)
            }
            Some(("versionCode", value)) => {
                doc.version_code = Some(int_setting(value, "versionCode", *line)?)
            }
            Some(("versionName", value)) => {
                doc.version_name = Some(string_setting(value, "versionName", *line)?)
            }
            _ => skip(node),
        }
    }
    Ok(())
}

fn read_compile_options(body: &[Node], doc: &mut RawDocument) -> Result<(), DocumentError> {
    for node in body {
        let Node::Statement { text, line } = node else {
            skip(node);
            continue;
        };
        match assignment(text) {
            Some(("sourceCompatibility", value)) => {
                doc.compile_options.source_compatibility = Some(java_version(value, *line)?)
            }
            Some(("targetCompatibility", value)) => {
                doc.compile_options.target_compatibility = Some(java_version(value, *line)?)
            }
            _ => skip(node),
        }
    }
    Ok(())
}

fn read_kotlin_options(body: &[Node], doc: &mut RawDocument) -> Result<(), DocumentError> {
    for node in body {
        let Node::Statement { text, line } = node else {
            skip(node);
            continue;
        };
        if let Some(("jvmTarget", value)) = assignment(text) {
            let target = match value.parse::<JavaVersion>() {
                Ok(version) => version.to_string(),
                Err(_) => string_literal(value, "jvmTarget", *line)?,
            };
            doc.kotlin_options.jvm_target = Some(target);
        } else {
            skip(node);
        }
    }
    Ok(())
}

fn read_build_types(body: &[Node], doc: &mut RawDocument) -> Result<(), DocumentError> {
    for node in body {
        let Node::Block { header, line, body } = node else {
            skip(node);
            continue;
        };
        let Some(caps) = NAMED_CONTAINER_ENTRY.captures(header) else {
            skip(node);
            continue;
        };
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let mut signing_config = None;
        for statement in body {
            let Node::Statement { text, line } = statement else {
                skip(statement);
                continue;
            };
            match assignment(text) {
                Some(("signingConfig", value)) => {
                    signing_config = Some(signing_ref(value, *line)?);
                }
                _ => skip(statement),
            }
        }

        // The debug build type is signed with the debug config unless told otherwise.
        let signing_config = match (signing_config, name.as_str()) {
            (Some(signing), _) => signing,
            (None, "debug") => "debug".to_string(),
            (None, _) => {
                return Err(DocumentError::MissingSigningConfig {
                    line: *line,
                    build_type: name,
                });
            }
        };
        doc.build_types
            .insert(name, RawBuildType::signed_with(signing_config));
    }
    Ok(())
}

fn read_flutter(body: &[Node], doc: &mut RawDocument) -> Result<(), DocumentError> {
    for node in body {
        let Node::Statement { text, line } = node else {
            skip(node);
            continue;
        };
        if let Some(("source", value)) = assignment(text) {
            let source = string_literal(value, "source", *line)?;
            doc.flutter.get_or_insert_with(Default::default).source = Some(PathBuf::from(source));
        } else {
            skip(node);
        }
    }
    Ok(())
}

fn assignment(text: &str) -> Option<(&str, &str)> {
    let caps = ASSIGNMENT.captures(text)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2)?.as_str().trim();
    Some((key, value))
}

/// Drop trailing conversions such as `.toInt()` that only change the type.
fn strip_conversions(value: &str) -> &str {
    let mut value = value.trim();
    for suffix in [".toInt()", ".toInteger()", ".toString()"] {
        if let Some(stripped) = value.strip_suffix(suffix) {
            value = stripped;
        }
    }
    value
}

fn unquote(value: &str) -> Option<String> {
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = value.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(inner.replace(&format!("\\{quote}"), &quote.to_string()).replace("\\\\", "\\"))
}

fn string_literal(value: &str, field: &str, line: usize) -> Result<String, DocumentError> {
    unquote(value.trim()).ok_or_else(|| {
        DocumentError::syntax(line, format!("`{field}` expects a string, found `{value}`"))
    })
}

fn int_setting(value: &str, field: &str, line: usize) -> Result<Setting<u32>, DocumentError> {
    let value = strip_conversions(value);
    if INTEGER.is_match(value) {
        let n = value.parse::<u32>().map_err(|_| {
            DocumentError::syntax(line, format!("`{field}` value {value} is out of range"))
        })?;
        Ok(Setting::Literal(n))
    } else if SYMBOL.is_match(value) {
        Ok(Setting::inherit(value))
    } else {
        Err(DocumentError::syntax(
            line,
            format!("`{field}` expects an integer or toolchain property, found `{value}`"),
        ))
    }
}

fn string_setting(value: &str, field: &str, line: usize) -> Result<Setting<String>, DocumentError> {
    let value = strip_conversions(value);
    if let Some(literal) = unquote(value) {
        Ok(Setting::Literal(literal))
    } else if SYMBOL.is_match(value) {
        Ok(Setting::inherit(value))
    } else {
        Err(DocumentError::syntax(
            line,
            format!("`{field}` expects a string or toolchain property, found `{value}`"),
        ))
    }
}

fn java_version(value: &str, line: usize) -> Result<JavaVersion, DocumentError> {
    value
        .parse()
        .map_err(|e| DocumentError::syntax(line, format!("{e}")))
}

fn signing_ref(value: &str, line: usize) -> Result<String, DocumentError> {
    let caps = SIGNING_REF.captures(value.trim()).ok_or_else(|| {
        DocumentError::syntax(
            line,
            format!("`signingConfig` expects a signingConfigs reference, found `{value}`"),
        )
    })?;
    Ok((1..=3)
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Module script as generated for a Flutter app, with local edits.
    const FLUTTER_MODULE: &str = r#"
plugins {
    id("com.android.application")
    id("kotlin-android")
    id("dev.flutter.flutter-gradle-plugin")
}

android {
    namespace = "com.example.exchange_mobile"
    compileSdk =36 // flutter.compileSdkVersion
    ndkVersion = flutter.ndkVersion

    compileOptions {
        sourceCompatibility = JavaVersion.VERSION_11
        targetCompatibility = JavaVersion.VERSION_11
    }

    kotlinOptions {
        jvmTarget = JavaVersion.VERSION_11.toString()
    }

    defaultConfig {
        // Specify your own unique Application ID.
        applicationId = "com.example.exchange_mobile"
    // Set minSdk to 23 so devices running Android 6 (API 23) are supported.
    minSdk = flutter.minSdkVersion
        targetSdk =  33 // flutter.targetSdkVersion
        versionCode = flutter.versionCode
        versionName = flutter.versionName
    }

    buildTypes {
        release {
            // Signing with the debug keys for now.
            signingConfig = signingConfigs.getByName("debug")
        }
    }
}

flutter {
    source = "../.."
}
"#;

    #[test]
    fn test_parse_flutter_module() {
        let doc = parse(FLUTTER_MODULE).unwrap();

        let ids: Vec<&str> = doc.plugins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            ["com.android.application", "kotlin-android", "dev.flutter.flutter-gradle-plugin"]
        );
        assert_eq!(doc.namespace.as_deref(), Some("com.example.exchange_mobile"));
        assert_eq!(doc.application_id.as_deref(), Some("com.example.exchange_mobile"));
        assert_eq!(doc.compile_sdk, Some(Setting::Literal(36)));
        assert_eq!(doc.ndk_version, Some(Setting::inherit("flutter.ndkVersion")));
        assert_eq!(doc.min_sdk, Some(Setting::inherit("flutter.minSdkVersion")));
        assert_eq!(doc.target_sdk, Some(Setting::Literal(33)));
        assert_eq!(doc.version_code, Some(Setting::inherit("flutter.versionCode")));
        assert_eq!(doc.version_name, Some(Setting::inherit("flutter.versionName")));
        assert_eq!(
            doc.compile_options.source_compatibility,
            Some(JavaVersion::VERSION_11)
        );
        assert_eq!(doc.kotlin_options.jvm_target.as_deref(), Some("11"));
        assert_eq!(doc.build_types["release"].signing_config, "debug");
        assert_eq!(
            doc.flutter.unwrap().source,
            Some(PathBuf::from("../.."))
        );
    }

    #[test]
    fn test_plugin_forms() {
        let doc = parse(
            r#"
            plugins {
                id("com.android.application") version "8.7.0" apply false
                kotlin("android") version "2.1.0"
                `kotlin-dsl`
                alias(libs.plugins.compose)
            }
            "#,
        )
        .unwrap();
        assert_eq!(doc.plugins.len(), 3);
        assert_eq!(doc.plugins[0].version.as_deref(), Some("8.7.0"));
        assert_eq!(doc.plugins[1].id, "org.jetbrains.kotlin.android");
        assert_eq!(doc.plugins[1].version.as_deref(), Some("2.1.0"));
        assert_eq!(doc.plugins[2].id, "kotlin-dsl");
    }

    #[test]
    fn test_groovy_spellings() {
        let doc = parse(
            r#"
            plugins { id 'com.android.application' }
            android {
                compileSdkVersion 34
                defaultConfig {
                    applicationId 'com.example.groovy'
                    minSdkVersion flutter.minSdkVersion
                    targetSdkVersion 34
                    versionCode flutter.versionCode.toInteger()
                }
                buildTypes {
                    release { signingConfig signingConfigs.release }
                    debug { }
                }
            }
            "#,
        )
        .unwrap();
        assert_eq!(doc.plugins[0].id, "com.android.application");
        assert_eq!(doc.compile_sdk, Some(Setting::Literal(34)));
        assert_eq!(doc.application_id.as_deref(), Some("com.example.groovy"));
        assert_eq!(doc.version_code, Some(Setting::inherit("flutter.versionCode")));
        assert_eq!(doc.build_types["release"].signing_config, "release");
        assert_eq!(doc.build_types["debug"].signing_config, "debug");
    }

    #[test]
    fn test_named_build_type_containers() {
        let doc = parse(
            r#"
            android {
                buildTypes {
                    getByName("release") { signingConfig = signingConfigs["upload"] }
                    create("staging") {
                        signingConfig = signingConfigs.getByName("debug")
                        isMinifyEnabled = false
                    }
                }
            }
            "#,
        )
        .unwrap();
        assert_eq!(doc.build_types["release"].signing_config, "upload");
        assert_eq!(doc.build_types["staging"].signing_config, "debug");
    }

    #[test]
    fn test_unsigned_release_is_rejected() {
        let err = parse("android {\n  buildTypes {\n    release {\n      isMinifyEnabled = true\n    }\n  }\n}\n")
            .unwrap_err();
        match err {
            DocumentError::MissingSigningConfig { line, build_type } => {
                assert_eq!(line, 3);
                assert_eq!(build_type, "release");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_comments_and_semicolons() {
        let doc = parse(
            "android { /* multi\n line */ namespace = \"a.b\"; compileSdk = 35 }\n// trailing { comment",
        )
        .unwrap();
        assert_eq!(doc.namespace.as_deref(), Some("a.b"));
        assert_eq!(doc.compile_sdk, Some(Setting::Literal(35)));
    }

    #[test]
    fn test_braces_inside_strings() {
        let doc = parse("android { namespace = \"a.{b}\" }").unwrap();
        assert_eq!(doc.namespace.as_deref(), Some("a.{b}"));
    }

    #[test]
    fn test_unbalanced_braces() {
        let err = parse("android {\n  namespace = \"a.b\"\n").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { line: 1, .. }));

        let err = parse("android { }\n}").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("android {\n  namespace = \"a.b\n}").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_bad_values() {
        let err = parse("android {\n  compileSdk = \"36\"\n}").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { line: 2, .. }));

        let err = parse("android {\n  compileOptions {\n    sourceCompatibility = JavaVersion.VERSION_X\n  }\n}")
            .unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { line: 3, .. }));
    }

    #[test]
    fn test_multiline_call_arguments() {
        let doc = parse("plugins {\n  id(\n    \"com.android.library\"\n  )\n}").unwrap();
        assert_eq!(doc.plugins[0].id, "com.android.library");
    }
}
