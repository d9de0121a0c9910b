//! Shared build policy applied to every module
//!
//! The policy is not module-configurable: modules can only opt out of
//! specific parts of it through [`PolicyOverride`] flags.
//!
//! [`PolicyOverride`]: crate::registry::PolicyOverride

use crate::registry::{Dependency, DependencyScope};
use serde::{Deserialize, Serialize};

/// Source/target language compatibility baseline
pub const LANGUAGE_LEVEL: &str = "11";

/// Compiler diagnostics enabled for every module
pub const COMPILER_ARGS: &[&str] = &["-Xlint:deprecation"];

/// Repositories every module resolves dependencies from
pub const REPOSITORIES: &[&str] = &[
    "https://repo.maven.apache.org/maven2/",
    "https://plugins.gradle.org/m2/",
];

const JETBRAINS_ANNOTATIONS: &str = "org.jetbrains:annotations:24.1.0";
const LOMBOK: &str = "org.projectlombok:lombok:1.18.30";

/// Grouping used by overrides to drop parts of the default set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyGroup {
    Baseline,
    AnnotationProcessing,
}

/// A default dependency together with its group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultDependency {
    pub group: DependencyGroup,
    pub dependency: Dependency,
}

impl DefaultDependency {
    fn new(group: DependencyGroup, scope: DependencyScope, notation: &str) -> Self {
        Self {
            group,
            dependency: Dependency::new(scope, notation),
        }
    }
}

/// Policy values the propagator applies uniformly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPolicy {
    #[serde(rename = "languageLevel")]
    pub language_level: String,
    #[serde(rename = "compilerArgs")]
    pub compiler_args: Vec<String>,
    pub repositories: Vec<String>,
    #[serde(rename = "defaultDependencies")]
    pub default_dependencies: Vec<DefaultDependency>,
}

impl Default for BuildPolicy {
    fn default() -> Self {
        Self {
            language_level: LANGUAGE_LEVEL.to_string(),
            compiler_args: COMPILER_ARGS.iter().map(|s| s.to_string()).collect(),
            repositories: REPOSITORIES.iter().map(|s| s.to_string()).collect(),
            default_dependencies: vec![
                DefaultDependency::new(
                    DependencyGroup::Baseline,
                    DependencyScope::CompileOnly,
                    JETBRAINS_ANNOTATIONS,
                ),
                DefaultDependency::new(
                    DependencyGroup::AnnotationProcessing,
                    DependencyScope::CompileOnly,
                    LOMBOK,
                ),
                DefaultDependency::new(
                    DependencyGroup::AnnotationProcessing,
                    DependencyScope::AnnotationProcessor,
                    LOMBOK,
                ),
            ],
        }
    }
}

impl BuildPolicy {
    /// Default dependencies, minus the annotation-processing group if skipped
    pub fn default_dependencies_for(&self, skip_annotation_processing: bool) -> Vec<Dependency> {
        self.default_dependencies
            .iter()
            .filter(|d| !(skip_annotation_processing && d.group == DependencyGroup::AnnotationProcessing))
            .map(|d| d.dependency.clone())
            .collect()
    }

    /// Dependencies belonging to the annotation-processing group
    pub fn annotation_processing_dependencies(&self) -> Vec<&Dependency> {
        self.default_dependencies
            .iter()
            .filter(|d| d.group == DependencyGroup::AnnotationProcessing)
            .map(|d| &d.dependency)
            .collect()
    }
}
