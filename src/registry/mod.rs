pub mod module_registry;

pub use module_registry::{
    Dependency, DependencyScope, ModuleDescriptor, ModuleRegistry, PolicyOverride,
};
