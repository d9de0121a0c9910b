//! Configuration structures and types for build-propagator
//!
//! This module provides type-safe configuration management with serde support.

use crate::core::error::ConfigurationError;
use crate::registry::{Dependency, DependencyScope, ModuleDescriptor, ModuleRegistry, PolicyOverride};
use crate::security::credentials::CredentialKeys;
use crate::validation::version_validator::SNAPSHOT_MARKER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default license header file, relative to the project root
pub const DEFAULT_HEADER_FILE: &str = "license_header.txt";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Schema version (required)
    pub version: String,

    /// Extend from base configuration file (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Project-wide coordinates (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectConfig>,

    /// License header policy (optional, defaults to license_header.txt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseConfig>,

    /// Credential lookup key overrides (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialsConfig>,

    /// Publishing settings (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing: Option<PublishingConfig>,

    /// Plugin modules, in propagation order
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Project-wide coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Version inherited by modules that do not set their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// License header configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LicenseConfig {
    /// Header file path, relative to the configuration file
    #[serde(skip_serializing_if = "Option::is_none", rename = "headerFile")]
    pub header_file: Option<String>,

    /// Inline template (takes precedence over headerFile)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Placeholder values besides `year`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}

/// Credential lookup key overrides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CredentialsConfig {
    #[serde(skip_serializing_if = "Option::is_none", rename = "snapshotUrl")]
    pub snapshot_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "releaseUrl")]
    pub release_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Publishing settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PublishingConfig {
    /// Version substring marking snapshot builds (default: "SNAPSHOT")
    #[serde(skip_serializing_if = "Option::is_none", rename = "snapshotMarker")]
    pub snapshot_marker: Option<String>,
}

/// One plugin module declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleConfig {
    pub name: String,

    #[serde(rename = "pluginId")]
    pub plugin_id: String,

    #[serde(rename = "entryPoint")]
    pub entry_point: String,

    /// Module version (default: project.version)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<PolicyOverride>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Dependency>>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "licenseProperties")]
    pub license_properties: Option<BTreeMap<String, String>>,
}

impl ModuleConfig {
    pub fn new(name: &str, plugin_id: &str, entry_point: &str) -> Self {
        Self {
            name: name.to_string(),
            plugin_id: plugin_id.to_string(),
            entry_point: entry_point.to_string(),
            version: None,
            overrides: None,
            dependencies: None,
            license_properties: None,
        }
    }
}

impl BuildConfig {
    /// Effective version of a module declaration
    pub fn module_version(&self, module: &ModuleConfig) -> String {
        module
            .version
            .clone()
            .or_else(|| self.project.as_ref().and_then(|p| p.version.clone()))
            .unwrap_or_default()
    }

    /// Credential lookup keys with overrides applied
    pub fn credential_keys(&self) -> CredentialKeys {
        let mut keys = CredentialKeys::default();
        if let Some(credentials) = &self.credentials {
            if let Some(key) = &credentials.snapshot_url {
                keys.snapshot_url = key.clone();
            }
            if let Some(key) = &credentials.release_url {
                keys.release_url = key.clone();
            }
            if let Some(key) = &credentials.username {
                keys.username = key.clone();
            }
            if let Some(key) = &credentials.password {
                keys.password = key.clone();
            }
        }
        keys
    }

    pub fn snapshot_marker(&self) -> String {
        self.publishing
            .as_ref()
            .and_then(|p| p.snapshot_marker.clone())
            .unwrap_or_else(|| SNAPSHOT_MARKER.to_string())
    }

    /// Convert module declarations into descriptors, in declaration order
    pub fn to_descriptors(&self) -> Vec<ModuleDescriptor> {
        self.modules
            .iter()
            .map(|module| ModuleDescriptor {
                name: module.name.clone(),
                plugin_id: module.plugin_id.clone(),
                entry_point: module.entry_point.clone(),
                version: self.module_version(module),
                overrides: module.overrides.iter().flatten().copied().collect(),
                dependencies: module.dependencies.clone().unwrap_or_default(),
                license_properties: module.license_properties.clone().unwrap_or_default(),
            })
            .collect()
    }

    /// Build the module registry; fails on duplicate names or plugin ids
    pub fn to_registry(&self) -> Result<ModuleRegistry, ConfigurationError> {
        ModuleRegistry::from_descriptors(self.to_descriptors())
    }

    /// The builder/run/slib plugin suite written by `init`
    pub fn reference() -> Self {
        let mut builder = ModuleConfig::new(
            "builder",
            "org.screamingsandals.plugin-builder",
            "org.screamingsandals.gradle.builder.BuilderPlugin",
        );
        builder.overrides = Some(vec![PolicyOverride::SkipDefaultAnnotationProcessor]);
        builder.dependencies = Some(vec![
            Dependency::new(DependencyScope::Implementation, "com.jcraft:jsch:0.1.55"),
            Dependency::new(DependencyScope::Implementation, "gradle.plugin.org.cadixdev.gradle:licenser:0.6.1"),
            Dependency::new(DependencyScope::Implementation, "com.github.johnrengelman:shadow:8.1.1"),
        ]);

        let mut run = ModuleConfig::new(
            "run",
            "org.screamingsandals.plugin-run",
            "org.screamingsandals.gradle.run.RunPlugin",
        );
        run.dependencies = Some(vec![Dependency::new(
            DependencyScope::Implementation,
            "com.google.code.gson:gson:2.10.1",
        )]);

        let mut slib = ModuleConfig::new(
            "slib",
            "org.screamingsandals.plugin-slib",
            "org.screamingsandals.gradle.slib.SLibPlugin",
        );
        slib.dependencies = Some(vec![
            Dependency::new(DependencyScope::CompileOnly, "org.jetbrains.kotlin:kotlin-gradle-plugin:1.9.22"),
            Dependency::new(DependencyScope::CompileOnly, "org.jetbrains.kotlin:kotlin-sam-with-receiver:1.9.22"),
            Dependency::new(DependencyScope::CompileOnly, "com.github.johnrengelman:shadow:8.1.1"),
        ]);

        Self {
            project: Some(ProjectConfig {
                group: Some("org.screamingsandals.gradle".to_string()),
                version: Some("1.0.0-SNAPSHOT".to_string()),
            }),
            license: Some(LicenseConfig {
                header_file: Some(DEFAULT_HEADER_FILE.to_string()),
                template: None,
                properties: Some(BTreeMap::from([(
                    "author".to_string(),
                    "ScreamingSandals".to_string(),
                )])),
            }),
            modules: vec![builder, run, slib],
            ..Default::default()
        }
    }
}

/// Default configuration values
impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            extends: None,
            project: None,
            license: None,
            credentials: None,
            publishing: None,
            modules: Vec::new(),
        }
    }
}
