//! Build Propagator CLI
//!
//! Applies the shared build policy to every module of a plugin suite

use anyhow::{Context, Result};
use build_propagator::license::DEFAULT_TEMPLATE;
use build_propagator::orchestration::PropagationOptions;
use build_propagator::security::{mask_secret, redact_url_userinfo};
use build_propagator::{
    BuildConfig, ConfigLoadOptions, ConfigLoader, ConfigPropagator, ConfigurationError,
    CredentialSet, DEFAULT_HEADER_FILE, EnvCredentialProvider, PropagationResult,
    PublishTargetResolver,
};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment flag marking a CI runner
const CI_OPTIMIZE_ENV: &str = "OPTIMIZE_FOR_CI_CD";

/// Multi-module build configuration propagator
#[derive(Parser)]
#[command(name = "build-propagator")]
#[command(version = "0.1.0")]
#[command(about = "Multi-module build configuration propagator", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a propagation pass and print the module configurations
    Apply {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip local-repository install tasks
        #[arg(long)]
        ci: bool,
    },

    /// Validate the configuration without running a pass
    Check {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,
    },

    /// Initialize build-propagator configuration
    Init {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            project_path,
            format,
            ci,
        } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            apply_command(path, format, ci).await
        }
        Commands::Check { project_path } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            check_command(path).await
        }
        Commands::Init {
            project_path,
            force,
        } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            init_command(path, force).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("build_propagator={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_options(project_path: &Path) -> ConfigLoadOptions {
    ConfigLoadOptions {
        project_path: project_path.to_path_buf(),
        env: std::env::vars().collect::<HashMap<_, _>>(),
    }
}

async fn apply_command(project_path: PathBuf, format: OutputFormat, ci: bool) -> Result<i32> {
    let config = match ConfigLoader::load(load_options(&project_path)).await {
        Ok(config) => config,
        Err(e) => return Ok(report_error(&e)),
    };

    let validation = ConfigLoader::validate(&config);
    if !validation.valid {
        eprintln!("{}", ConfigLoader::format_validation_result(&validation));
        return Ok(1);
    }

    let license = match ConfigLoader::load_license(&config, &project_path).await {
        Ok(license) => license,
        Err(e) => return Ok(report_error(&e)),
    };
    let registry = match config.to_registry() {
        Ok(registry) => registry,
        Err(e) => return Ok(report_error(&e)),
    };

    let credentials = CredentialSet::from_provider(&EnvCredentialProvider, &config.credential_keys());
    let ci_optimized = ci || std::env::var(CI_OPTIMIZE_ENV).is_ok_and(|v| v == "1");

    let propagator = ConfigPropagator::new()
        .with_resolver(PublishTargetResolver::with_marker(config.snapshot_marker()))
        .with_options(PropagationOptions { ci_optimized });

    let result = match propagator.apply(&registry, &credentials, &license) {
        Ok(result) => result,
        Err(e) => return Ok(report_error(&e)),
    };

    println!("{}", render_output(&result, format)?);
    Ok(0)
}

fn render_output(result: &PropagationResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_text(result),
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).context("failed to serialize result as JSON")?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(result).context("failed to serialize result as YAML")?
        }
    })
}

fn format_text(result: &PropagationResult) -> String {
    let mut lines = vec!["\n🔧 build-propagator\n".to_string()];

    for configuration in &result.configurations {
        lines.push(format!("📦 {} ({})", configuration.module, configuration.version));
        lines.push(format!("  plugin: {} → {}", configuration.plugin.id, configuration.plugin.implementation_class));
        lines.push(format!(
            "  java {} {}",
            configuration.language_level,
            configuration.compiler_args.join(" ")
        ));
        for dependency in &configuration.dependencies {
            lines.push(format!("  {}", dependency));
        }
        if !configuration.artifacts.is_empty() {
            lines.push(format!("  artifacts: {}", configuration.artifacts.join(", ")));
        }
        match &configuration.publishing {
            Some(wiring) => lines.push(format!(
                "  🚀 {} repository {} as {}",
                wiring.repository,
                redact_url_userinfo(&wiring.url),
                wiring.username
            )),
            None => lines.push("  ⏸️  publishing disabled".to_string()),
        }
        lines.push(format!("  tasks: {}", configuration.tasks.join(" → ")));
        lines.push(String::new());
    }

    lines.push(result.report.format_summary());
    lines.join("\n")
}

fn report_error(error: &ConfigurationError) -> i32 {
    eprintln!("\n❌ {} [{}]", error, error.code());
    let actions = error.suggested_actions();
    if !actions.is_empty() {
        eprintln!("\n💡 Suggested actions:");
        for action in actions {
            eprintln!("  - {}", action);
        }
    }
    1
}

async fn check_command(project_path: PathBuf) -> Result<i32> {
    println!("\n🔍 Configuration Check\n");

    let config = match ConfigLoader::load(load_options(&project_path)).await {
        Ok(config) => config,
        Err(e) => return Ok(report_error(&e)),
    };

    let validation = ConfigLoader::validate(&config);
    println!("{}", ConfigLoader::format_validation_result(&validation));
    if !validation.valid {
        return Ok(1);
    }

    let license = match ConfigLoader::load_license(&config, &project_path).await {
        Ok(license) => license,
        Err(e) => return Ok(report_error(&e)),
    };
    let registry = match config.to_registry() {
        Ok(registry) => registry,
        Err(e) => return Ok(report_error(&e)),
    };

    let mut failed = false;
    for module in &registry {
        match license.render_with(&module.license_properties) {
            Ok(_) => println!("  ✅ {} license header renders", module.name),
            Err(e) => {
                println!("  ❌ {}: {}", module.name, e);
                failed = true;
            }
        }
    }

    let credentials = CredentialSet::from_provider(&EnvCredentialProvider, &config.credential_keys());
    if let Some(complete) = credentials.complete() {
        println!(
            "\n🔐 Publishing credentials complete ({} as {}, password {})",
            redact_url_userinfo(complete.release_url),
            complete.username,
            mask_secret(complete.password.expose_secret())
        );
    } else {
        println!(
            "\n⚠️  Publishing disabled, missing: {}",
            credentials.missing().join(", ")
        );
    }

    println!();
    Ok(if failed { 1 } else { 0 })
}

async fn init_command(project_path: PathBuf, force: bool) -> Result<i32> {
    println!("\n🎯 Initialize build-propagator\n");

    let config = BuildConfig::reference();
    let config_path = match ConfigLoader::write_config(&project_path, &config, force).await {
        Ok(path) => path,
        Err(e) => return Ok(report_error(&e)),
    };
    println!("  ✅ Wrote {}", config_path.display());

    let header_path = project_path.join(DEFAULT_HEADER_FILE);
    if header_path.exists() && !force {
        println!("  ⏭️  Kept existing {}", header_path.display());
    } else {
        tokio::fs::write(&header_path, DEFAULT_TEMPLATE)
            .await
            .with_context(|| format!("failed to write {}", header_path.display()))?;
        println!("  ✅ Wrote {}", header_path.display());
    }

    println!("\nNext: set NEXUS_URL_SNAPSHOT, NEXUS_URL_RELEASE, NEXUS_USERNAME and NEXUS_PASSWORD to enable publishing.\n");
    Ok(0)
}
