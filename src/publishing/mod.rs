//! Publishing repository selection and wiring

pub mod resolver;

pub use resolver::{PublishDecision, PublishTargetResolver, PublishWiring, RepositoryKind};
