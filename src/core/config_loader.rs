//! Configuration file loader for build-propagator
//!
//! This module provides configuration loading, validation, and merging capabilities.

use super::config::*;
use crate::core::error::ConfigurationError;
use crate::license::LicenseHeader;
use crate::validation::version_validator::VersionValidator;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".build-propagator.yaml";

/// Environment variable overriding project.version
pub const PROJECT_VERSION_ENV: &str = "BUILD_PROJECT_VERSION";

/// Maximum depth of `extends` chains
const MAX_EXTENDS_DEPTH: usize = 8;

/// Configuration load options
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationResult {
    /// Is configuration valid?
    pub valid: bool,

    /// Validation errors
    pub errors: Vec<ConfigValidationError>,

    /// Validation warnings
    pub warnings: Vec<ConfigValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Field path (e.g., "modules[0].pluginId")
    pub field: String,

    /// Error message
    pub message: String,

    /// Expected type/value
    pub expected: Option<String>,

    /// Actual type/value
    pub actual: Option<String>,
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationWarning {
    /// Field path
    pub field: String,

    /// Warning message
    pub message: String,

    /// Suggestion
    pub suggestion: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the project configuration
    ///
    /// Priority (high to low):
    /// 1. Environment variables
    /// 2. Project config (./.build-propagator.yaml)
    /// 3. Files named by `extends`
    pub async fn load(options: ConfigLoadOptions) -> Result<BuildConfig, ConfigurationError> {
        let config_path = options.project_path.join(CONFIG_FILENAME);

        let config = Self::load_config_file(&config_path, 0)
            .await?
            .ok_or_else(|| ConfigurationError::InvalidConfig {
                message: format!(
                    "{} not found (run `build-propagator init` to create one)",
                    config_path.display()
                ),
            })?;

        Ok(Self::apply_env_overrides(config, &options.env))
    }

    /// Load configuration from YAML file
    fn load_config_file(
        file_path: &Path,
        depth: usize,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<Option<BuildConfig>, ConfigurationError>>
                + Send
                + '_,
        >,
    > {
        Box::pin(async move {
            if depth > MAX_EXTENDS_DEPTH {
                return Err(ConfigurationError::InvalidConfig {
                    message: format!(
                        "extends chain deeper than {} files at {}",
                        MAX_EXTENDS_DEPTH,
                        file_path.display()
                    ),
                });
            }

            // Check if file exists
            if !file_path.exists() {
                return Ok(None);
            }

            debug!(path = %file_path.display(), "loading configuration file");
            let content = fs::read_to_string(file_path)
                .await
                .map_err(|e| ConfigurationError::Io {
                    path: file_path.display().to_string(),
                    message: e.to_string(),
                })?;

            let config: BuildConfig =
                serde_yaml::from_str(&content).map_err(|e| ConfigurationError::InvalidConfig {
                    message: format!("failed to parse {}: {}", file_path.display(), e),
                })?;

            // Handle extends if present
            if let Some(extends_path) = &config.extends {
                let base_path = file_path
                    .parent()
                    .ok_or_else(|| ConfigurationError::InvalidConfig {
                        message: "invalid config file path".to_string(),
                    })?
                    .join(extends_path);

                match Self::load_config_file(&base_path, depth + 1).await? {
                    Some(base_config) => {
                        return Ok(Some(Self::merge_configs(vec![base_config, config])));
                    }
                    None => {
                        return Err(ConfigurationError::InvalidConfig {
                            message: format!("extended file {} not found", base_path.display()),
                        });
                    }
                }
            }

            Ok(Some(config))
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: BuildConfig, env: &HashMap<String, String>) -> BuildConfig {
        // BUILD_PROJECT_VERSION -> project.version
        if let Some(version) = env.get(PROJECT_VERSION_ENV).filter(|v| !v.is_empty()) {
            let project = config.project.get_or_insert_with(ProjectConfig::default);
            project.version = Some(version.clone());
        }

        config
    }

    /// Merge multiple configurations with priority
    fn merge_configs(configs: Vec<BuildConfig>) -> BuildConfig {
        let mut result = BuildConfig::default();

        for config in configs {
            Self::merge_into(&mut result, config);
        }

        result
    }

    /// Merge source config into target
    fn merge_into(target: &mut BuildConfig, source: BuildConfig) {
        // Version
        if !source.version.is_empty() {
            target.version = source.version;
        }

        // Extends is resolved while loading
        target.extends = None;

        // Project
        if let Some(source_project) = source.project {
            let target_project = target.project.get_or_insert_with(ProjectConfig::default);

            if source_project.group.is_some() {
                target_project.group = source_project.group;
            }
            if source_project.version.is_some() {
                target_project.version = source_project.version;
            }
        }

        // License
        if let Some(source_license) = source.license {
            let target_license = target.license.get_or_insert_with(LicenseConfig::default);

            if source_license.template.is_some() || source_license.header_file.is_some() {
                target_license.template = source_license.template;
                target_license.header_file = source_license.header_file;
            }
            if let Some(source_properties) = source_license.properties {
                target_license
                    .properties
                    .get_or_insert_with(Default::default)
                    .extend(source_properties);
            }
        }

        // Credentials
        if source.credentials.is_some() {
            target.credentials = source.credentials;
        }

        // Publishing
        if source.publishing.is_some() {
            target.publishing = source.publishing;
        }

        // Modules
        if !source.modules.is_empty() {
            target.modules = source.modules;
        }
    }

    /// Resolve the license header template and properties
    ///
    /// An inline template wins over a header file. `year` is bound to the
    /// current year unless the properties set it explicitly.
    pub async fn load_license(
        config: &BuildConfig,
        project_path: &Path,
    ) -> Result<LicenseHeader, ConfigurationError> {
        let license = config.license.clone().unwrap_or_default();

        let template = match license.template {
            Some(template) => template,
            None => {
                let header_path =
                    project_path.join(license.header_file.as_deref().unwrap_or(DEFAULT_HEADER_FILE));
                debug!(path = %header_path.display(), "reading license header");
                fs::read_to_string(&header_path)
                    .await
                    .map_err(|e| ConfigurationError::Io {
                        path: header_path.display().to_string(),
                        message: e.to_string(),
                    })?
            }
        };

        let mut header = LicenseHeader::new(template);
        for (name, value) in license.properties.unwrap_or_default() {
            header = header.with_property(name, value);
        }

        Ok(header)
    }

    /// Write a configuration file, refusing to overwrite unless forced
    pub async fn write_config(
        project_path: &Path,
        config: &BuildConfig,
        force: bool,
    ) -> Result<PathBuf, ConfigurationError> {
        let config_path = project_path.join(CONFIG_FILENAME);

        if config_path.exists() && !force {
            return Err(ConfigurationError::InvalidConfig {
                message: format!("{} already exists (use --force to overwrite)", config_path.display()),
            });
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigurationError::InvalidConfig {
            message: format!("failed to serialize configuration: {}", e),
        })?;

        fs::write(&config_path, yaml)
            .await
            .map_err(|e| ConfigurationError::Io {
                path: config_path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(config_path)
    }

    /// Validate configuration
    pub fn validate(config: &BuildConfig) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Check version (required)
        if config.version.is_empty() {
            errors.push(ConfigValidationError {
                field: "version".to_string(),
                message: "Version is required".to_string(),
                expected: Some("string (e.g., \"1.0\")".to_string()),
                actual: Some("empty".to_string()),
            });
        } else if config.version != "1.0" {
            warnings.push(ConfigValidationWarning {
                field: "version".to_string(),
                message: format!("Unknown version: {}", config.version),
                suggestion: Some("Currently supported version is \"1.0\" only".to_string()),
            });
        }

        // 2. Validate modules
        Self::validate_modules(config, &mut errors, &mut warnings);

        // 3. Validate license settings
        if let Some(license) = &config.license {
            Self::validate_license(license, &mut errors, &mut warnings);
        }

        // 4. Validate publishing settings
        if let Some(publishing) = &config.publishing {
            Self::validate_publishing(publishing, &mut errors, &mut warnings);
        }

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Validate module declarations
    fn validate_modules(
        config: &BuildConfig,
        errors: &mut Vec<ConfigValidationError>,
        warnings: &mut Vec<ConfigValidationWarning>,
    ) {
        if config.modules.is_empty() {
            errors.push(ConfigValidationError {
                field: "modules".to_string(),
                message: "At least one module is required".to_string(),
                expected: Some("non-empty array".to_string()),
                actual: Some("empty array".to_string()),
            });
            return;
        }

        let versions = VersionValidator::with_marker(config.snapshot_marker());
        let mut names = HashSet::new();
        let mut plugin_ids = HashSet::new();

        for (i, module) in config.modules.iter().enumerate() {
            let required = [
                ("name", &module.name),
                ("pluginId", &module.plugin_id),
                ("entryPoint", &module.entry_point),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    errors.push(ConfigValidationError {
                        field: format!("modules[{}].{}", i, field),
                        message: format!("{} is required", field),
                        expected: Some("non-empty string".to_string()),
                        actual: Some("empty".to_string()),
                    });
                }
            }

            if !module.name.is_empty() && !names.insert(module.name.as_str()) {
                errors.push(ConfigValidationError {
                    field: format!("modules[{}].name", i),
                    message: format!("Duplicate module name '{}'", module.name),
                    expected: Some("unique name".to_string()),
                    actual: Some(module.name.clone()),
                });
            }

            if !module.plugin_id.is_empty() && !plugin_ids.insert(module.plugin_id.as_str()) {
                errors.push(ConfigValidationError {
                    field: format!("modules[{}].pluginId", i),
                    message: format!("Duplicate plugin id '{}'", module.plugin_id),
                    expected: Some("unique plugin id".to_string()),
                    actual: Some(module.plugin_id.clone()),
                });
            }

            if !module.plugin_id.is_empty() && !module.plugin_id.contains('.') {
                warnings.push(ConfigValidationWarning {
                    field: format!("modules[{}].pluginId", i),
                    message: format!("Plugin id '{}' is not a dotted identifier", module.plugin_id),
                    suggestion: Some("Use a reverse-domain id such as org.example.my-plugin".to_string()),
                });
            }

            let version = config.module_version(module);
            if let Some(message) = versions.release_routing_warning(&version) {
                warnings.push(ConfigValidationWarning {
                    field: format!("modules[{}].version", i),
                    message,
                    suggestion: Some(
                        "Set project.version or the module version to a semantic version".to_string(),
                    ),
                });
            }
        }
    }

    /// Validate license settings
    fn validate_license(
        license: &LicenseConfig,
        errors: &mut Vec<ConfigValidationError>,
        _warnings: &mut Vec<ConfigValidationWarning>,
    ) {
        if let Some(template) = &license.template
            && template.trim().is_empty()
        {
            errors.push(ConfigValidationError {
                field: "license.template".to_string(),
                message: "template must not be empty".to_string(),
                expected: Some("non-empty string".to_string()),
                actual: Some("empty".to_string()),
            });
        }

        if let Some(header_file) = &license.header_file
            && header_file.trim().is_empty()
        {
            errors.push(ConfigValidationError {
                field: "license.headerFile".to_string(),
                message: "headerFile must not be empty".to_string(),
                expected: Some("path".to_string()),
                actual: Some("empty".to_string()),
            });
        }
    }

    /// Validate publishing settings
    fn validate_publishing(
        publishing: &PublishingConfig,
        errors: &mut Vec<ConfigValidationError>,
        _warnings: &mut Vec<ConfigValidationWarning>,
    ) {
        if let Some(marker) = &publishing.snapshot_marker
            && marker.is_empty()
        {
            errors.push(ConfigValidationError {
                field: "publishing.snapshotMarker".to_string(),
                message: "snapshotMarker must not be empty".to_string(),
                expected: Some("non-empty string (e.g., \"SNAPSHOT\")".to_string()),
                actual: Some("empty".to_string()),
            });
        }
    }

    /// Format validation result as human-readable string
    pub fn format_validation_result(result: &ConfigValidationResult) -> String {
        let mut lines = Vec::new();

        if result.valid {
            lines.push("✅ Configuration validation succeeded".to_string());
        } else {
            lines.push("❌ Configuration has errors".to_string());
        }

        if !result.errors.is_empty() {
            lines.push("\n🔴 Errors:".to_string());
            for error in &result.errors {
                lines.push(format!("  - [{}] {}", error.field, error.message));
                if let (Some(expected), Some(actual)) = (&error.expected, &error.actual) {
                    lines.push(format!("    Expected: {}", expected));
                    lines.push(format!("    Actual: {}", actual));
                }
            }
        }

        if !result.warnings.is_empty() {
            lines.push("\n🟡 Warnings:".to_string());
            for warning in &result.warnings {
                lines.push(format!("  - [{}] {}", warning.field, warning.message));
                if let Some(suggestion) = &warning.suggestion {
                    lines.push(format!("    Suggestion: {}", suggestion));
                }
            }
        }

        lines.join("\n")
    }
}
