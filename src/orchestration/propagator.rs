//! Config Propagator - Applies the shared build policy to every module
//!
//! One propagation pass walks the registry in registration order and, for
//! each module:
//! - sets the language compatibility baseline and compiler diagnostics
//! - declares the default dependencies (minus overridden groups) and the
//!   module's own dependencies
//! - renders the license header
//! - resolves and wires the publishing repository
//!
//! The pass is all-or-nothing. Configurations are collected locally and only
//! returned once every module has been configured.

use crate::core::error::ConfigurationError;
use crate::license::{LicenseError, LicenseHeader};
use crate::orchestration::policy::BuildPolicy;
use crate::publishing::{PublishDecision, PublishTargetResolver, PublishWiring};
use crate::registry::{Dependency, ModuleDescriptor, ModuleRegistry, PolicyOverride};
use crate::security::CredentialSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Task that builds the module artifact
pub const BUILD_TASK: &str = "build";
/// Task that installs the artifact into the local repository
pub const PUBLISH_LOCAL_TASK: &str = "publishToMavenLocal";
/// Task that uploads the artifact to the wired repository
pub const PUBLISH_TASK: &str = "publish";

/// Options for one propagation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Skip the local-repository install task (set on CI runners)
    pub ci_optimized: bool,
}

/// Plugin declaration for the module's plugin descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDeclaration {
    pub id: String,
    #[serde(rename = "implementationClass")]
    pub implementation_class: String,
}

/// Finalized configuration handed to the build executor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfiguration {
    pub module: String,
    pub version: String,
    pub language_level: String,
    pub compiler_args: Vec<String>,
    pub repositories: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub license_header: String,
    pub plugin: PluginDeclaration,
    pub artifacts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing: Option<PublishWiring>,
    pub tasks: Vec<String>,
}

impl ModuleConfiguration {
    pub fn is_publishable(&self) -> bool {
        self.publishing.is_some()
    }
}

/// Per-module record of what the pass applied
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport {
    pub module: String,
    pub license_applied: bool,
    pub dependencies: Vec<Dependency>,
    pub decision: PublishDecision,
    /// Whether a repository was actually wired
    pub published: bool,
}

/// Summary of one propagation pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub pass_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub modules: Vec<ModuleReport>,
}

impl ApplyReport {
    pub fn module(&self, name: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.module == name)
    }

    pub fn published_count(&self) -> usize {
        self.modules.iter().filter(|m| m.published).count()
    }

    /// Format the report as human-readable lines
    pub fn format_summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Propagation pass {}", self.pass_id));

        for module in &self.modules {
            let publishing = match (module.decision.target(), module.published) {
                (Some(target), true) => format!("→ {}", target),
                (Some(target), false) => format!("{} (disabled by override)", target),
                (None, _) => "unpublishable".to_string(),
            };
            lines.push(format!(
                "  - {}: {} dependencies, license {}, {}",
                module.module,
                module.dependencies.len(),
                if module.license_applied { "applied" } else { "missing" },
                publishing
            ));
        }

        lines.push(format!(
            "{} of {} modules publishable",
            self.published_count(),
            self.modules.len()
        ));
        lines.join("\n")
    }
}

/// Output of a successful pass
#[derive(Debug, Clone, Serialize)]
pub struct PropagationResult {
    pub configurations: Vec<ModuleConfiguration>,
    pub report: ApplyReport,
}

impl PropagationResult {
    pub fn configuration(&self, module: &str) -> Option<&ModuleConfiguration> {
        self.configurations.iter().find(|c| c.module == module)
    }
}

/// Top-level orchestrator for a propagation pass
#[derive(Debug, Clone, Default)]
pub struct ConfigPropagator {
    policy: BuildPolicy,
    resolver: PublishTargetResolver,
    options: PropagationOptions,
}

impl ConfigPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(mut self, resolver: PublishTargetResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_options(mut self, options: PropagationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(&self) -> &BuildPolicy {
        &self.policy
    }

    /// Apply the shared policy to every registered module
    ///
    /// Fails fast with [`ConfigurationError::UnresolvedPlaceholder`] naming the
    /// first module whose license header cannot be rendered. Missing
    /// credentials leave modules unpublishable without failing.
    pub fn apply(
        &self,
        registry: &ModuleRegistry,
        credentials: &CredentialSet,
        license: &LicenseHeader,
    ) -> Result<PropagationResult, ConfigurationError> {
        let pass_id = Uuid::new_v4();
        info!(%pass_id, modules = registry.len(), "starting propagation pass");

        if !credentials.is_complete() {
            warn!(
                missing = ?credentials.missing(),
                "publishing credentials incomplete; modules will not be published"
            );
        }

        let mut configurations = Vec::with_capacity(registry.len());
        let mut reports = Vec::with_capacity(registry.len());

        for module in registry {
            let (configuration, report) = self.configure_module(module, credentials, license)?;
            configurations.push(configuration);
            reports.push(report);
        }

        let report = ApplyReport {
            pass_id,
            generated_at: Utc::now(),
            modules: reports,
        };
        info!(
            %pass_id,
            published = report.published_count(),
            "propagation pass finished"
        );

        Ok(PropagationResult {
            configurations,
            report,
        })
    }

    fn configure_module(
        &self,
        module: &ModuleDescriptor,
        credentials: &CredentialSet,
        license: &LicenseHeader,
    ) -> Result<(ModuleConfiguration, ModuleReport), ConfigurationError> {
        debug!(module = %module.name, version = %module.version, "configuring module");

        // Dependencies
        let skip_annotation_processing =
            module.has_override(PolicyOverride::SkipDefaultAnnotationProcessor);
        let mut dependencies = self.policy.default_dependencies_for(skip_annotation_processing);
        dependencies.extend(module.dependencies.iter().cloned());
        if skip_annotation_processing {
            debug!(module = %module.name, "annotation-processing dependencies skipped");
        }

        // License header
        let license_header = license
            .render_with(&module.license_properties)
            .map_err(|e| match e {
                LicenseError::UnresolvedPlaceholder { placeholder } => {
                    ConfigurationError::UnresolvedPlaceholder {
                        module: module.name.clone(),
                        placeholder,
                    }
                }
            })?;

        // Publishing
        let (decision, wiring) = self.resolver.wire(&module.version, credentials);
        let publishing_allowed = !module.has_override(PolicyOverride::DisableRepositoryPublishing);
        let publishing = if publishing_allowed { wiring } else { None };
        match (&publishing, decision) {
            (Some(wiring), _) => {
                debug!(module = %module.name, repository = %wiring.repository, "publishing wired")
            }
            (None, PublishDecision::Enabled(_)) => {
                debug!(module = %module.name, "publishing disabled by override")
            }
            (None, PublishDecision::Disabled) => {
                debug!(module = %module.name, "module left unpublishable")
            }
        }

        let mut artifacts = vec!["jar".to_string()];
        if credentials.has_repository_urls() {
            artifacts.push("sources".to_string());
        }

        let tasks = self.compile_tasks(publishing_allowed, publishing.is_some());

        let report = ModuleReport {
            module: module.name.clone(),
            license_applied: true,
            dependencies: dependencies.clone(),
            decision,
            published: publishing.is_some(),
        };

        let configuration = ModuleConfiguration {
            module: module.name.clone(),
            version: module.version.clone(),
            language_level: self.policy.language_level.clone(),
            compiler_args: self.policy.compiler_args.clone(),
            repositories: self.policy.repositories.clone(),
            dependencies,
            license_header,
            plugin: PluginDeclaration {
                id: module.plugin_id.clone(),
                implementation_class: module.entry_point.clone(),
            },
            artifacts,
            publishing,
            tasks,
        };

        Ok((configuration, report))
    }

    /// Task plan: build, then local install and upload where applicable
    fn compile_tasks(&self, publishing_allowed: bool, repository_wired: bool) -> Vec<String> {
        let mut tasks = vec![BUILD_TASK.to_string()];

        if publishing_allowed {
            if !self.options.ci_optimized {
                tasks.push(PUBLISH_LOCAL_TASK.to_string());
            }
            if repository_wired {
                tasks.push(PUBLISH_TASK.to_string());
            }
        }

        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publishing::RepositoryKind;
    use crate::registry::DependencyScope;
    use crate::security::{
        CredentialKeys, PASSWORD_KEY, RELEASE_URL_KEY, SNAPSHOT_URL_KEY, StaticCredentialProvider,
        USERNAME_KEY,
    };
    use secrecy::ExposeSecret;

    const HEADER: &str = "Copyright ${year} ScreamingSandals";

    fn complete_credentials() -> CredentialSet {
        let provider = StaticCredentialProvider::new()
            .with(SNAPSHOT_URL_KEY, "https://repo.example.com/snapshots")
            .with(RELEASE_URL_KEY, "https://repo.example.com/releases")
            .with(USERNAME_KEY, "deployer")
            .with(PASSWORD_KEY, "deploy-password-123");
        CredentialSet::from_provider(&provider, &CredentialKeys::default())
    }

    fn credentials_without_password() -> CredentialSet {
        let provider = StaticCredentialProvider::new()
            .with(SNAPSHOT_URL_KEY, "https://repo.example.com/snapshots")
            .with(RELEASE_URL_KEY, "https://repo.example.com/releases")
            .with(USERNAME_KEY, "deployer");
        CredentialSet::from_provider(&provider, &CredentialKeys::default())
    }

    fn module(name: &str, version: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(
            name,
            format!("org.example.plugin-{}", name),
            format!("org.example.{}.Plugin", name),
            version,
        )
    }

    fn registry(modules: Vec<ModuleDescriptor>) -> ModuleRegistry {
        ModuleRegistry::from_descriptors(modules).unwrap()
    }

    fn license() -> LicenseHeader {
        LicenseHeader::with_year(HEADER, 2024)
    }

    #[test]
    fn test_release_and_snapshot_routing() {
        let registry = registry(vec![module("A", "1.0.0"), module("B", "1.0.0-SNAPSHOT")]);

        let result = ConfigPropagator::new()
            .apply(&registry, &complete_credentials(), &license())
            .unwrap();

        let a = result.report.module("A").unwrap();
        let b = result.report.module("B").unwrap();
        assert_eq!(a.decision, PublishDecision::Enabled(RepositoryKind::Release));
        assert_eq!(b.decision, PublishDecision::Enabled(RepositoryKind::Snapshot));
        assert!(a.published && b.published);

        let a_wiring = result.configuration("A").unwrap().publishing.as_ref().unwrap();
        assert_eq!(a_wiring.url, "https://repo.example.com/releases");
        assert_eq!(a_wiring.password.expose_secret(), "deploy-password-123");

        let b_wiring = result.configuration("B").unwrap().publishing.as_ref().unwrap();
        assert_eq!(b_wiring.url, "https://repo.example.com/snapshots");
    }

    #[test]
    fn test_missing_password_disables_all_publishing() {
        let registry = registry(vec![module("A", "1.0.0"), module("B", "1.0.0-SNAPSHOT")]);

        let result = ConfigPropagator::new()
            .apply(&registry, &credentials_without_password(), &license())
            .unwrap();

        for report in &result.report.modules {
            assert!(!report.decision.is_enabled());
            assert!(!report.published);
        }
        for configuration in &result.configurations {
            assert!(!configuration.is_publishable());
            assert!(!configuration.tasks.contains(&PUBLISH_TASK.to_string()));
        }
        assert_eq!(result.report.published_count(), 0);
    }

    #[test]
    fn test_skip_annotation_processor_only_for_flagged_module() {
        let registry = registry(vec![
            module("C", "1.0.0").with_override(PolicyOverride::SkipDefaultAnnotationProcessor),
            module("D", "1.0.0"),
        ]);
        let propagator = ConfigPropagator::new();

        let result = propagator
            .apply(&registry, &CredentialSet::empty(), &license())
            .unwrap();

        let processing = propagator.policy().annotation_processing_dependencies();
        let c = &result.report.module("C").unwrap().dependencies;
        let d = &result.report.module("D").unwrap().dependencies;

        for dependency in processing {
            assert!(!c.contains(dependency));
            assert!(d.contains(dependency));
        }
        assert!(c.iter().all(|dep| dep.scope != DependencyScope::AnnotationProcessor));
        assert!(d.iter().any(|dep| dep.scope == DependencyScope::AnnotationProcessor));
        // Baseline defaults still reach the flagged module
        assert!(!c.is_empty());
    }

    #[test]
    fn test_shared_policy_applied_to_every_module() {
        let registry = registry(vec![
            module("builder", "2.0.0"),
            module("run", "2.0.0"),
            module("slib", "2.0.0"),
        ]);

        let result = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license())
            .unwrap();

        assert_eq!(result.configurations.len(), 3);
        for configuration in &result.configurations {
            assert_eq!(configuration.language_level, "11");
            assert_eq!(configuration.compiler_args, vec!["-Xlint:deprecation".to_string()]);
            assert_eq!(configuration.license_header, "Copyright 2024 ScreamingSandals");
            assert_eq!(configuration.repositories.len(), 2);
        }
        assert!(result.report.modules.iter().all(|m| m.license_applied));
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = registry(vec![module("slib", "1.0.0"), module("builder", "1.0.0"), module("run", "1.0.0")]);

        let result = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license())
            .unwrap();

        let order: Vec<&str> = result.configurations.iter().map(|c| c.module.as_str()).collect();
        assert_eq!(order, vec!["slib", "builder", "run"]);
        let report_order: Vec<&str> = result.report.modules.iter().map(|m| m.module.as_str()).collect();
        assert_eq!(report_order, order);
    }

    #[test]
    fn test_unresolved_placeholder_aborts_pass() {
        let registry = registry(vec![module("A", "1.0.0"), module("B", "1.0.0")]);
        let license = LicenseHeader::with_year("Copyright ${year} ${owner}", 2024);

        let error = ConfigPropagator::new()
            .apply(&registry, &complete_credentials(), &license)
            .unwrap_err();

        assert_eq!(
            error,
            ConfigurationError::UnresolvedPlaceholder {
                module: "A".to_string(),
                placeholder: "owner".to_string(),
            }
        );
    }

    #[test]
    fn test_module_license_property_failure_names_module() {
        let license = LicenseHeader::with_year("${year} ${component}", 2024);
        let registry = registry(vec![
            module("A", "1.0.0").with_license_property("component", "alpha"),
            module("B", "1.0.0"),
        ]);

        let error = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license)
            .unwrap_err();

        assert_eq!(error.module(), Some("B"));
    }

    #[test]
    fn test_module_license_properties() {
        let license = LicenseHeader::with_year("${year} ${component}", 2024).with_property("component", "suite");
        let registry = registry(vec![
            module("A", "1.0.0").with_license_property("component", "alpha"),
            module("B", "1.0.0"),
        ]);

        let result = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license)
            .unwrap();

        assert_eq!(result.configuration("A").unwrap().license_header, "2024 alpha");
        assert_eq!(result.configuration("B").unwrap().license_header, "2024 suite");
    }

    #[test]
    fn test_module_dependencies_appended_after_defaults() {
        let registry = registry(vec![module("run", "1.0.0").with_dependency(Dependency::new(
            DependencyScope::Implementation,
            "com.google.code.gson:gson:2.10.1",
        ))]);

        let result = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license())
            .unwrap();

        let dependencies = &result.configuration("run").unwrap().dependencies;
        assert_eq!(dependencies.len(), 4);
        assert_eq!(dependencies.last().unwrap().notation, "com.google.code.gson:gson:2.10.1");
    }

    #[test]
    fn test_disable_repository_publishing_override() {
        let registry = registry(vec![
            module("A", "1.0.0").with_override(PolicyOverride::DisableRepositoryPublishing),
            module("B", "1.0.0"),
        ]);

        let result = ConfigPropagator::new()
            .apply(&registry, &complete_credentials(), &license())
            .unwrap();

        let a = result.report.module("A").unwrap();
        assert!(a.decision.is_enabled());
        assert!(!a.published);
        assert_eq!(result.configuration("A").unwrap().tasks, vec![BUILD_TASK.to_string()]);

        assert!(result.report.module("B").unwrap().published);
    }

    #[test]
    fn test_task_plan() {
        let registry = registry(vec![module("A", "1.0.0")]);

        let local = ConfigPropagator::new()
            .apply(&registry, &complete_credentials(), &license())
            .unwrap();
        assert_eq!(
            local.configuration("A").unwrap().tasks,
            vec!["build", "publishToMavenLocal", "publish"]
        );

        let ci = ConfigPropagator::new()
            .with_options(PropagationOptions { ci_optimized: true })
            .apply(&registry, &complete_credentials(), &license())
            .unwrap();
        assert_eq!(ci.configuration("A").unwrap().tasks, vec!["build", "publish"]);

        let offline = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license())
            .unwrap();
        assert_eq!(
            offline.configuration("A").unwrap().tasks,
            vec!["build", "publishToMavenLocal"]
        );
    }

    #[test]
    fn test_sources_artifact_requires_repository_urls() {
        let registry = registry(vec![module("A", "1.0.0")]);

        let with_urls = ConfigPropagator::new()
            .apply(&registry, &credentials_without_password(), &license())
            .unwrap();
        assert_eq!(with_urls.configuration("A").unwrap().artifacts, vec!["jar", "sources"]);

        let without = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license())
            .unwrap();
        assert_eq!(without.configuration("A").unwrap().artifacts, vec!["jar"]);
    }

    #[test]
    fn test_plugin_declaration() {
        let registry = registry(vec![module("builder", "1.0.0")]);

        let result = ConfigPropagator::new()
            .apply(&registry, &CredentialSet::empty(), &license())
            .unwrap();

        let plugin = &result.configuration("builder").unwrap().plugin;
        assert_eq!(plugin.id, "org.example.plugin-builder");
        assert_eq!(plugin.implementation_class, "org.example.builder.Plugin");
    }

    #[test]
    fn test_empty_registry() {
        let result = ConfigPropagator::new()
            .apply(&ModuleRegistry::new(), &complete_credentials(), &license())
            .unwrap();

        assert!(result.configurations.is_empty());
        assert!(result.report.modules.is_empty());
    }

    #[test]
    fn test_serialized_result_never_contains_password() {
        let registry = registry(vec![module("A", "1.0.0-SNAPSHOT")]);

        let result = ConfigPropagator::new()
            .apply(&registry, &complete_credentials(), &license())
            .unwrap();

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"targetRepository\":\"snapshot\""));
        assert!(json.contains("\"licenseHeader\":\"Copyright 2024 ScreamingSandals\""));
        assert!(!json.contains("deploy-password-123"));
    }

    #[test]
    fn test_format_summary() {
        let registry = registry(vec![module("A", "1.0.0"), module("B", "1.0.0-SNAPSHOT")]);

        let result = ConfigPropagator::new()
            .apply(&registry, &complete_credentials(), &license())
            .unwrap();

        let summary = result.report.format_summary();
        assert!(summary.contains("A: 3 dependencies, license applied, → release"));
        assert!(summary.contains("B: 3 dependencies, license applied, → snapshot"));
        assert!(summary.contains("2 of 2 modules publishable"));
    }
}
