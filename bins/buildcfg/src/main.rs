//! buildcfg CLI
//!
//! Resolves an Android module's build configuration against toolchain
//! defaults and reports problems before Gradle runs.

use anyhow::Result;
use buildcfg_android::{
    lint, resolve, BuildDescriptor, DefaultValue, DefaultsProvider, LayeredDefaults,
    PropertiesDefaults, RawDocument, SigningRegistry, ToolchainDefaults,
};
use buildcfg_cli::output::{self, Status};
use buildcfg_core::config::{Config, ToolchainPreset};
use buildcfg_core::error::{exit_codes, Error};
use buildcfg_telemetry::{Timer, TelemetryConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "buildcfg")]
#[command(about = "Resolve and check Android module build configuration")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Properties file supplying inherited values (overrides the config)
    #[arg(long, global = true, value_name = "PATH")]
    local_properties: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a module document and print the descriptor
    Resolve {
        /// Module document (.gradle.kts, .gradle, .toml or .json)
        document: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve and lint a module document
    Check {
        /// Module document (.gradle.kts, .gradle, .toml or .json)
        document: Option<PathBuf>,
        /// Fail on warnings
        #[arg(long)]
        strict: bool,
    },

    /// Print the effective defaults and where each value comes from
    Defaults {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        output::set_color(false);
    }

    buildcfg_telemetry::init_with_config(TelemetryConfig {
        log_level: buildcfg_telemetry::level_for(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        ..TelemetryConfig::default()
    })?;

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(fail(&e)),
    };
    if let Some(path) = &config.path {
        tracing::info!(path = %path.display(), "Loaded config");
    }

    let exit_code = match &cli.command {
        Commands::Resolve { document, json } => {
            run_resolve(&cli, &config, document.as_deref(), *json)
        }
        Commands::Check { document, strict } => {
            run_check(&cli, &config, document.as_deref(), *strict)
        }
        Commands::Defaults { json } => run_defaults(&cli, &config, *json),
    };

    std::process::exit(exit_code);
}

fn run_resolve(cli: &Cli, config: &Config, document: Option<&Path>, json: bool) -> i32 {
    let descriptor = match load_and_resolve(cli, config, document) {
        Ok(descriptor) => descriptor,
        Err(e) if json => return fail_json(&e),
        Err(e) => return fail(&e),
    };

    if json {
        return match serde_json::to_string_pretty(&descriptor) {
            Ok(text) => {
                println!("{text}");
                exit_codes::SUCCESS
            }
            Err(e) => fail(&Error::from(e)),
        };
    }

    print_descriptor(&descriptor);
    exit_codes::SUCCESS
}

fn run_check(cli: &Cli, config: &Config, document: Option<&Path>, strict: bool) -> i32 {
    let descriptor = match load_and_resolve(cli, config, document) {
        Ok(descriptor) => descriptor,
        Err(e) => return fail(&e),
    };

    let result = lint::lint(&descriptor, &config.schema.lint);
    output::report_issues(&result);

    let summary = format!(
        "{}: {}",
        descriptor.application_id(),
        output::issue_summary(&result)
    );
    if let Err(e) = result.to_result() {
        Status::error(&summary);
        return fail(&e);
    }
    if strict && !result.warnings().is_empty() {
        Status::error(&format!("{summary} (--strict)"));
        return exit_codes::VALIDATION_ERROR;
    }

    if !cli.quiet {
        Status::success(&summary);
    }
    exit_codes::SUCCESS
}

fn run_defaults(cli: &Cli, config: &Config, json: bool) -> i32 {
    let defaults = match build_defaults(cli, config) {
        Ok(defaults) => defaults,
        Err(e) if json => return fail_json(&e),
        Err(e) => return fail(&e),
    };

    let rows: Vec<(String, DefaultValue, String)> = defaults
        .entries()
        .into_iter()
        .map(|(key, value)| {
            let source = defaults
                .lookup_with_source(&key)
                .map(|(name, _)| name.to_string())
                .unwrap_or_default();
            (key, value, source)
        })
        .collect();

    if json {
        let entries: Vec<serde_json::Value> = rows
            .iter()
            .map(|(key, value, source)| {
                serde_json::json!({ "key": key, "value": value, "source": source })
            })
            .collect();
        return match serde_json::to_string_pretty(&entries) {
            Ok(text) => {
                println!("{text}");
                exit_codes::SUCCESS
            }
            Err(e) => fail(&Error::from(e)),
        };
    }

    if rows.is_empty() {
        if !cli.quiet {
            Status::info("No defaults configured");
        }
        return exit_codes::SUCCESS;
    }

    Status::header(&format!(
        "Defaults ({})",
        defaults.names().collect::<Vec<_>>().join(" > ")
    ));
    let fields: Vec<(&str, String)> = rows
        .iter()
        .map(|(key, value, source)| (key.as_str(), format!("{value}  [{source}]")))
        .collect();
    output::print_fields(&fields);
    exit_codes::SUCCESS
}

/// Read the document, assemble defaults and signing configs, then resolve
fn load_and_resolve(
    cli: &Cli,
    config: &Config,
    document: Option<&Path>,
) -> Result<BuildDescriptor, Error> {
    let path = match document {
        Some(path) => path.to_path_buf(),
        None => config.relative_path(&config.schema.general.document),
    };
    tracing::info!(document = %path.display(), "Resolving module");

    let timer = Timer::start("resolve");
    let doc = RawDocument::load(&path)
        .map_err(|e| Error::from(e).with_context(path.display().to_string()))?;
    let defaults = build_defaults(cli, config)?;
    let registry = SigningRegistry::from_entries(&config.schema.signing);
    let descriptor = resolve(&doc, &defaults, &registry)?;
    let elapsed = timer.stop();
    tracing::info!(elapsed = %output::format_duration(elapsed), "Resolved module");

    Ok(descriptor)
}

/// Layers in precedence order: config overrides, properties file, preset
fn build_defaults(cli: &Cli, config: &Config) -> Result<LayeredDefaults<'static>, Error> {
    let mut defaults = LayeredDefaults::new();

    let overrides = ToolchainDefaults::from_toml_table(&config.schema.toolchain.overrides);
    if !overrides.is_empty() {
        defaults = defaults.push("config", overrides);
    }

    let properties = match &cli.local_properties {
        Some(path) => Some(path.clone()),
        None => {
            let path = config.relative_path(&config.schema.general.local_properties);
            path.exists().then_some(path)
        }
    };
    if let Some(path) = properties {
        let props = PropertiesDefaults::load(&path)
            .map_err(|e| Error::from(e).with_context(path.display().to_string()))?;
        tracing::info!(path = %path.display(), "Loaded properties");
        defaults = defaults.push("local.properties", props);
    }

    if config.schema.toolchain.preset == ToolchainPreset::Flutter {
        defaults = defaults.push("flutter", ToolchainDefaults::flutter());
    }

    Ok(defaults)
}

fn print_descriptor(descriptor: &BuildDescriptor) {
    Status::header(descriptor.application_id());
    output::print_fields(&[
        ("namespace", descriptor.namespace().to_string()),
        ("compileSdk", descriptor.compile_sdk().to_string()),
        ("minSdk", descriptor.min_sdk().to_string()),
        ("targetSdk", descriptor.target_sdk().to_string()),
        ("versionCode", descriptor.version_code().to_string()),
        ("versionName", descriptor.version_name().to_string()),
        ("ndkVersion", descriptor.ndk_version().unwrap_or("-").to_string()),
        ("sourceCompatibility", descriptor.source_compatibility().to_string()),
        ("targetCompatibility", descriptor.target_compatibility().to_string()),
        ("jvmTarget", descriptor.jvm_target().unwrap_or("-").to_string()),
    ]);

    if !descriptor.plugins().is_empty() {
        Status::subheader("Plugins");
        let plugins: Vec<(&str, String)> = descriptor
            .plugins()
            .iter()
            .map(|plugin| {
                let version = plugin.version().map(|v| v.to_string()).unwrap_or_default();
                (plugin.id(), version)
            })
            .collect();
        output::print_fields(&plugins);
    }

    if !descriptor.build_types().is_empty() {
        Status::subheader("Build types");
        let build_types: Vec<(&str, String)> = descriptor
            .build_types()
            .iter()
            .map(|(name, build_type)| {
                let store = build_type
                    .signing()
                    .store_file()
                    .map(|p| format!(" ({})", p.display()))
                    .unwrap_or_default();
                let line = format!("signed with {}{store}", build_type.signing_config_ref());
                (name.as_str(), line)
            })
            .collect();
        output::print_fields(&build_types);
    }
}

/// Report an error and map it to an exit code
fn fail(error: &Error) -> i32 {
    Status::error(&format!("[{}] {}", error.code, error.message));
    if let Some(context) = &error.context {
        eprintln!("  in {context}");
    }
    if let Some(suggestion) = &error.suggestion {
        eprintln!("  hint: {suggestion}");
    }
    tracing::debug!(code = %error.code, "Command failed");
    error.code.exit_code()
}

/// Report an error as a JSON [`ErrorReport`](buildcfg_core::error::ErrorReport) on stdout
fn fail_json(error: &Error) -> i32 {
    match serde_json::to_string_pretty(&error.to_report()) {
        Ok(text) => println!("{text}"),
        Err(e) => return fail(&Error::from(e)),
    }
    tracing::debug!(code = %error.code, "Command failed");
    error.code.exit_code()
}
