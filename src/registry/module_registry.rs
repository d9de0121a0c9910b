//! Module Registry - Ordered collection of plugin modules
//!
//! Every module is one independently publishable plugin artifact. The
//! registry is the unit of propagation: it is built once per build
//! configuration and walked in registration order.
//!
//! # Example
//!
//! ```
//! use build_propagator::registry::{ModuleDescriptor, ModuleRegistry, PolicyOverride};
//!
//! let mut registry = ModuleRegistry::new();
//! registry
//!     .register(
//!         ModuleDescriptor::new(
//!             "builder",
//!             "org.screamingsandals.plugin-builder",
//!             "org.screamingsandals.gradle.builder.BuilderPlugin",
//!             "2.0.0",
//!         )
//!         .with_override(PolicyOverride::SkipDefaultAnnotationProcessor),
//!     )
//!     .unwrap();
//!
//! assert_eq!(registry.len(), 1);
//! ```

use crate::core::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Per-module exception to the shared policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyOverride {
    /// Omit the annotation-processing dependency group
    SkipDefaultAnnotationProcessor,
    /// Never wire a publishing repository or publishing tasks
    DisableRepositoryPublishing,
}

impl PolicyOverride {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyOverride::SkipDefaultAnnotationProcessor => "skip-default-annotation-processor",
            PolicyOverride::DisableRepositoryPublishing => "disable-repository-publishing",
        }
    }
}

/// Configuration a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyScope {
    Api,
    Implementation,
    CompileOnly,
    AnnotationProcessor,
    RuntimeOnly,
    TestImplementation,
}

impl DependencyScope {
    /// Name of the build configuration this scope maps to
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyScope::Api => "api",
            DependencyScope::Implementation => "implementation",
            DependencyScope::CompileOnly => "compileOnly",
            DependencyScope::AnnotationProcessor => "annotationProcessor",
            DependencyScope::RuntimeOnly => "runtimeOnly",
            DependencyScope::TestImplementation => "testImplementation",
        }
    }
}

/// A declared dependency (`group:artifact:version` notation)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub scope: DependencyScope,
    pub notation: String,
}

impl Dependency {
    pub fn new(scope: DependencyScope, notation: impl Into<String>) -> Self {
        Self {
            scope,
            notation: notation.into(),
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(\"{}\")", self.scope.as_str(), self.notation)
    }
}

/// Static description of one plugin module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(rename = "pluginId")]
    pub plugin_id: String,
    /// Implementation class reference; never resolved here
    #[serde(rename = "entryPoint")]
    pub entry_point: String,
    pub version: String,
    #[serde(default)]
    pub overrides: BTreeSet<PolicyOverride>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default, rename = "licenseProperties")]
    pub license_properties: BTreeMap<String, String>,
}

impl ModuleDescriptor {
    pub fn new(
        name: impl Into<String>,
        plugin_id: impl Into<String>,
        entry_point: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            plugin_id: plugin_id.into(),
            entry_point: entry_point.into(),
            version: version.into(),
            overrides: BTreeSet::new(),
            dependencies: Vec::new(),
            license_properties: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, policy_override: PolicyOverride) -> Self {
        self.overrides.insert(policy_override);
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_license_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.license_properties.insert(name.into(), value.into());
        self
    }

    pub fn has_override(&self, policy_override: PolicyOverride) -> bool {
        self.overrides.contains(&policy_override)
    }
}

/// Ordered set of modules with unique names and plugin ids
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    by_name: HashMap<String, usize>,
    by_plugin_id: HashMap<String, usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors, stopping at the first collision
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Append a module
    ///
    /// Fails with [`ConfigurationError::DuplicateModule`] when the name or the
    /// plugin id is already taken; the registry is left unchanged.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<(), ConfigurationError> {
        if let Some(&index) = self.by_name.get(&descriptor.name) {
            return Err(ConfigurationError::DuplicateModule {
                field: "name".to_string(),
                value: descriptor.name.clone(),
                module: descriptor.name,
                existing: self.modules[index].name.clone(),
            });
        }

        if let Some(&index) = self.by_plugin_id.get(&descriptor.plugin_id) {
            return Err(ConfigurationError::DuplicateModule {
                field: "pluginId".to_string(),
                value: descriptor.plugin_id,
                module: descriptor.name,
                existing: self.modules[index].name.clone(),
            });
        }

        let index = self.modules.len();
        self.by_name.insert(descriptor.name.clone(), index);
        self.by_plugin_id.insert(descriptor.plugin_id.clone(), index);
        self.modules.push(descriptor);
        Ok(())
    }

    /// Visit every module in registration order
    pub fn for_each<F>(&self, visitor: F)
    where
        F: FnMut(&ModuleDescriptor),
    {
        self.modules.iter().for_each(visitor);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModuleDescriptor> {
        self.modules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.by_name.get(name).map(|&index| &self.modules[index])
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<'a> IntoIterator for &'a ModuleRegistry {
    type Item = &'a ModuleDescriptor;
    type IntoIter = std::slice::Iter<'a, ModuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}
