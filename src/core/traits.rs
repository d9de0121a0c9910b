//! Core traits for configuration propagation
//!
//! This module defines the seams the propagation engine is injected through,
//! so tests can substitute deterministic fixtures for process state.

use std::collections::HashMap;

// ============================================================================
// Credential Lookup
// ============================================================================

/// Read-only key/value lookup for environment-style configuration values
///
/// Implementations must not fail: an unset name is reported as `None`.
/// Values are returned verbatim, without any validation of their contents.
///
/// # Examples
///
/// ```
/// use build_propagator::core::CredentialProvider;
/// use std::collections::HashMap;
///
/// let mut values = HashMap::new();
/// values.insert("NEXUS_USERNAME".to_string(), "deployer".to_string());
///
/// assert_eq!(values.lookup("NEXUS_USERNAME"), Some("deployer".to_string()));
/// assert_eq!(values.lookup("NEXUS_PASSWORD"), None);
/// ```
pub trait CredentialProvider {
    /// Look up a named value
    fn lookup(&self, name: &str) -> Option<String>;
}

impl CredentialProvider for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for &P {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}
