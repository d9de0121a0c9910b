pub mod version_validator;

pub use version_validator::{SNAPSHOT_MARKER, VersionValidationResult, VersionValidator};
