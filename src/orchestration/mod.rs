//! Orchestration layer for configuration propagation
//!
//! This module provides the propagation pass that applies the shared build
//! policy across every registered module.

pub mod policy;
pub mod propagator;

// Re-export main types for convenience
pub use policy::{BuildPolicy, DefaultDependency, DependencyGroup};
pub use propagator::{
    ApplyReport, ConfigPropagator, ModuleConfiguration, ModuleReport, PluginDeclaration,
    PropagationOptions, PropagationResult,
};
