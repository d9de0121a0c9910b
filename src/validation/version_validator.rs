//! Version Validator - Classifies module versions
//!
//! Repository routing only looks for the snapshot marker; semantic-version
//! parsing is used to warn about versions that route to the release
//! repository for lack of a recognizable shape.
//!
//! # Example
//!
//! ```
//! use build_propagator::validation::version_validator::VersionValidator;
//!
//! let validator = VersionValidator::new();
//! let result = validator.validate("2.0.1-SNAPSHOT");
//!
//! assert!(result.is_valid);
//! assert!(result.is_snapshot);
//! assert_eq!(result.prerelease, Some("SNAPSHOT".to_string()));
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};

/// Marker that identifies a pre-release build
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Result of version validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionValidationResult {
    /// Whether the version is valid semver
    pub is_valid: bool,
    /// Whether the version carries the snapshot marker
    pub is_snapshot: bool,
    /// Validation error message (if any)
    pub error: Option<String>,
    /// Pre-release component (e.g., "SNAPSHOT", "rc.1")
    pub prerelease: Option<String>,
}

/// Validator for module versions
#[derive(Debug, Clone)]
pub struct VersionValidator {
    marker: String,
}

impl Default for VersionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionValidator {
    /// Create a validator using the `SNAPSHOT` marker
    pub fn new() -> Self {
        Self::with_marker(SNAPSHOT_MARKER)
    }

    /// Create a validator with a custom snapshot marker
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Check whether a version string carries the snapshot marker
    ///
    /// The match is a case-sensitive substring check. Empty and malformed
    /// strings never match.
    ///
    /// # Examples
    ///
    /// ```
    /// use build_propagator::validation::VersionValidator;
    ///
    /// let validator = VersionValidator::new();
    ///
    /// assert!(validator.is_snapshot("1.0.0-SNAPSHOT"));
    /// assert!(!validator.is_snapshot("1.0.0-snapshot"));
    /// assert!(!validator.is_snapshot(""));
    /// ```
    pub fn is_snapshot(&self, version: &str) -> bool {
        !self.marker.is_empty() && version.contains(self.marker.as_str())
    }

    /// Validate a version string
    pub fn validate(&self, version: &str) -> VersionValidationResult {
        let is_snapshot = self.is_snapshot(version);

        match Version::parse(version) {
            Ok(parsed) => VersionValidationResult {
                is_valid: true,
                is_snapshot,
                error: None,
                prerelease: if parsed.pre.is_empty() {
                    None
                } else {
                    Some(parsed.pre.to_string())
                },
            },
            Err(e) => VersionValidationResult {
                is_valid: false,
                is_snapshot,
                error: Some(e.to_string()),
                prerelease: None,
            },
        }
    }

    /// Describe why a version would silently route to the release repository
    ///
    /// Returns `None` for well-formed versions.
    pub fn release_routing_warning(&self, version: &str) -> Option<String> {
        if version.trim().is_empty() {
            return Some("empty version routes to the release repository".to_string());
        }

        let result = self.validate(version);
        if result.is_valid || result.is_snapshot {
            return None;
        }

        Some(format!(
            "'{}' is not a semantic version and routes to the release repository",
            version
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_snapshot_true() {
        let validator = VersionValidator::new();
        assert!(validator.is_snapshot("1.0.0-SNAPSHOT"));
        assert!(validator.is_snapshot("2.0.1-SNAPSHOT+build.5"));
        assert!(validator.is_snapshot("SNAPSHOT"));
    }

    #[test]
    fn test_is_snapshot_false() {
        let validator = VersionValidator::new();
        assert!(!validator.is_snapshot("1.0.0"));
        assert!(!validator.is_snapshot("1.0.0-rc.1"));
        assert!(!validator.is_snapshot("1.0.0-snapshot"));
        assert!(!validator.is_snapshot(""));
    }

    #[test]
    fn test_custom_marker() {
        let validator = VersionValidator::with_marker("dev");
        assert!(validator.is_snapshot("1.0.0-dev.3"));
        assert!(!validator.is_snapshot("1.0.0-SNAPSHOT"));
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let validator = VersionValidator::with_marker("");
        assert!(!validator.is_snapshot("1.0.0"));
    }

    #[test]
    fn test_validate_release_version() {
        let validator = VersionValidator::new();
        let result = validator.validate("1.2.3");

        assert!(result.is_valid);
        assert!(!result.is_snapshot);
        assert!(result.prerelease.is_none());
    }

    #[test]
    fn test_validate_snapshot_version() {
        let validator = VersionValidator::new();
        let result = validator.validate("1.0.0-SNAPSHOT");

        assert!(result.is_valid);
        assert!(result.is_snapshot);
        assert_eq!(result.prerelease, Some("SNAPSHOT".to_string()));
    }

    #[test]
    fn test_validate_malformed_version() {
        let validator = VersionValidator::new();
        let result = validator.validate("latest");

        assert!(!result.is_valid);
        assert!(!result.is_snapshot);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_release_routing_warning() {
        let validator = VersionValidator::new();

        assert!(validator.release_routing_warning("1.0.0").is_none());
        assert!(validator.release_routing_warning("1.0-SNAPSHOT").is_none());
        assert!(validator.release_routing_warning("").is_some());
        assert!(
            validator
                .release_routing_warning("nightly")
                .unwrap()
                .contains("nightly")
        );
    }

    proptest! {
        #[test]
        fn marker_is_a_case_sensitive_substring(version in any::<String>()) {
            let validator = VersionValidator::new();
            prop_assert_eq!(validator.is_snapshot(&version), version.contains(SNAPSHOT_MARKER));
        }

        #[test]
        fn custom_marker_anywhere_is_snapshot(prefix in "[ -~]{0,16}", marker in "[A-Za-z-]{1,8}", suffix in "[ -~]{0,16}") {
            let validator = VersionValidator::with_marker(marker.clone());
            let version = format!("{}{}{}", prefix, marker, suffix);
            prop_assert!(validator.is_snapshot(&version));
            prop_assert!(validator.release_routing_warning(&version).is_none());
        }
    }
}
