pub mod core;
pub mod license;
pub mod orchestration;
pub mod publishing;
pub mod registry;
pub mod security;
pub mod validation;

pub use crate::core::*;
pub use license::{LicenseError, LicenseHeader};
pub use orchestration::{ApplyReport, ConfigPropagator, ModuleConfiguration, PropagationResult};
pub use publishing::{PublishDecision, PublishTargetResolver, RepositoryKind};
pub use registry::{ModuleDescriptor, ModuleRegistry, PolicyOverride};
pub use security::{CredentialSet, EnvCredentialProvider, StaticCredentialProvider};
