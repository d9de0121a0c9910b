//! Deployment credentials for repository publishing
//!
//! A [`CredentialSet`] is assembled once per build from a
//! [`CredentialProvider`] and is read-only afterwards. It is either complete
//! (all four slots present) or incomplete; there is no partial publishing mode.

use crate::core::traits::CredentialProvider;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// Default environment variable holding the snapshot repository URL
pub const SNAPSHOT_URL_KEY: &str = "NEXUS_URL_SNAPSHOT";
/// Default environment variable holding the release repository URL
pub const RELEASE_URL_KEY: &str = "NEXUS_URL_RELEASE";
/// Default environment variable holding the repository username
pub const USERNAME_KEY: &str = "NEXUS_USERNAME";
/// Default environment variable holding the repository password
pub const PASSWORD_KEY: &str = "NEXUS_PASSWORD";

/// Names under which the four credential slots are looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialKeys {
    #[serde(rename = "snapshotUrl")]
    pub snapshot_url: String,
    #[serde(rename = "releaseUrl")]
    pub release_url: String,
    pub username: String,
    pub password: String,
}

impl Default for CredentialKeys {
    fn default() -> Self {
        Self {
            snapshot_url: SNAPSHOT_URL_KEY.to_string(),
            release_url: RELEASE_URL_KEY.to_string(),
            username: USERNAME_KEY.to_string(),
            password: PASSWORD_KEY.to_string(),
        }
    }
}

/// Provider backed by the process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// Provider backed by a fixed map, used for fixtures and dry runs
#[derive(Debug, Default, Clone)]
pub struct StaticCredentialProvider {
    values: HashMap<String, String>,
}

impl StaticCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, returning the provider for chaining
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Credentials and repository URLs read for one build
pub struct CredentialSet {
    keys: CredentialKeys,
    snapshot_url: Option<String>,
    release_url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
}

/// Borrowed view of a complete credential set
#[derive(Clone, Copy)]
pub struct CompleteCredentials<'a> {
    pub snapshot_url: &'a str,
    pub release_url: &'a str,
    pub username: &'a str,
    pub password: &'a SecretString,
}

impl CredentialSet {
    /// Read all four slots from a provider
    ///
    /// # Examples
    ///
    /// ```
    /// use build_propagator::security::{CredentialKeys, CredentialSet, StaticCredentialProvider};
    ///
    /// let provider = StaticCredentialProvider::new()
    ///     .with("NEXUS_URL_SNAPSHOT", "https://repo.example.com/snapshots")
    ///     .with("NEXUS_URL_RELEASE", "https://repo.example.com/releases")
    ///     .with("NEXUS_USERNAME", "deployer");
    ///
    /// let credentials = CredentialSet::from_provider(&provider, &CredentialKeys::default());
    /// assert!(!credentials.is_complete());
    /// assert_eq!(credentials.missing(), vec!["NEXUS_PASSWORD"]);
    /// ```
    pub fn from_provider<P: CredentialProvider + ?Sized>(provider: &P, keys: &CredentialKeys) -> Self {
        Self {
            keys: keys.clone(),
            snapshot_url: provider.lookup(&keys.snapshot_url),
            release_url: provider.lookup(&keys.release_url),
            username: provider.lookup(&keys.username),
            password: provider
                .lookup(&keys.password)
                .map(|value| SecretString::new(value.into())),
        }
    }

    /// A set with every slot absent
    pub fn empty() -> Self {
        Self {
            keys: CredentialKeys::default(),
            snapshot_url: None,
            release_url: None,
            username: None,
            password: None,
        }
    }

    /// Returns all four slots at once, or `None` if any is absent
    pub fn complete(&self) -> Option<CompleteCredentials<'_>> {
        match (
            &self.snapshot_url,
            &self.release_url,
            &self.username,
            &self.password,
        ) {
            (Some(snapshot_url), Some(release_url), Some(username), Some(password)) => {
                Some(CompleteCredentials {
                    snapshot_url,
                    release_url,
                    username,
                    password,
                })
            }
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }

    /// Both repository URLs are known, regardless of the account slots
    pub fn has_repository_urls(&self) -> bool {
        self.snapshot_url.is_some() && self.release_url.is_some()
    }

    /// Lookup keys of the absent slots, in slot order
    pub fn missing(&self) -> Vec<&str> {
        let mut missing = Vec::new();
        if self.snapshot_url.is_none() {
            missing.push(self.keys.snapshot_url.as_str());
        }
        if self.release_url.is_none() {
            missing.push(self.keys.release_url.as_str());
        }
        if self.username.is_none() {
            missing.push(self.keys.username.as_str());
        }
        if self.password.is_none() {
            missing.push(self.keys.password.as_str());
        }
        missing
    }

    pub fn keys(&self) -> &CredentialKeys {
        &self.keys
    }
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("snapshot_url", &self.snapshot_url)
            .field("release_url", &self.release_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Copy a secret without exposing it outside this call
pub(crate) fn duplicate_secret(secret: &SecretString) -> SecretString {
    SecretString::new(secret.expose_secret().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_provider() -> StaticCredentialProvider {
        StaticCredentialProvider::new()
            .with(SNAPSHOT_URL_KEY, "https://repo.example.com/snapshots")
            .with(RELEASE_URL_KEY, "https://repo.example.com/releases")
            .with(USERNAME_KEY, "deployer")
            .with(PASSWORD_KEY, "hunter2-very-secret")
    }

    #[test]
    fn test_complete_set() {
        let credentials = CredentialSet::from_provider(&full_provider(), &CredentialKeys::default());

        assert!(credentials.is_complete());
        assert!(credentials.missing().is_empty());

        let complete = credentials.complete().unwrap();
        assert_eq!(complete.snapshot_url, "https://repo.example.com/snapshots");
        assert_eq!(complete.release_url, "https://repo.example.com/releases");
        assert_eq!(complete.username, "deployer");
        assert_eq!(complete.password.expose_secret(), "hunter2-very-secret");
    }

    #[test]
    fn test_each_missing_slot_makes_set_incomplete() {
        for key in [SNAPSHOT_URL_KEY, RELEASE_URL_KEY, USERNAME_KEY, PASSWORD_KEY] {
            let mut values = HashMap::new();
            for present in [SNAPSHOT_URL_KEY, RELEASE_URL_KEY, USERNAME_KEY, PASSWORD_KEY] {
                if present != key {
                    values.insert(present.to_string(), "value".to_string());
                }
            }

            let credentials = CredentialSet::from_provider(&values, &CredentialKeys::default());
            assert!(!credentials.is_complete(), "missing {} should be incomplete", key);
            assert_eq!(credentials.missing(), vec![key]);
        }
    }

    #[test]
    fn test_empty_set() {
        let credentials = CredentialSet::empty();

        assert!(!credentials.is_complete());
        assert!(!credentials.has_repository_urls());
        assert_eq!(credentials.missing().len(), 4);
    }

    #[test]
    fn test_custom_keys() {
        let keys = CredentialKeys {
            snapshot_url: "SNAP".to_string(),
            release_url: "REL".to_string(),
            username: "USER".to_string(),
            password: "PASS".to_string(),
        };
        let provider = StaticCredentialProvider::new()
            .with("SNAP", "s")
            .with("REL", "r")
            .with("USER", "u");

        let credentials = CredentialSet::from_provider(&provider, &keys);
        assert!(credentials.has_repository_urls());
        assert_eq!(credentials.missing(), vec!["PASS"]);
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = CredentialSet::from_provider(&full_provider(), &CredentialKeys::default());
        let debug = format!("{:?}", credentials);

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2-very-secret"));
    }

    #[test]
    fn test_env_provider_reads_process_environment() {
        let provider = EnvCredentialProvider::new();

        let existing = env::vars_os()
            .find_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)));
        if let Some((name, value)) = existing {
            assert_eq!(provider.lookup(&name), Some(value));
        }
        assert_eq!(provider.lookup("BUILD_PROPAGATOR_TEST_ENV_UNSET"), None);
    }

    #[test]
    fn test_duplicate_secret() {
        let secret = SecretString::new("abc".into());
        let copy = duplicate_secret(&secret);
        assert_eq!(copy.expose_secret(), "abc");
    }
}
