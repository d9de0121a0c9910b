//! Publish Target Resolver - Picks the repository for a build output
//!
//! The decision is a pure function of the module version and the credential
//! set. Wiring the decision into a module configuration happens elsewhere.

use crate::security::credentials::{CompleteCredentials, CredentialSet, duplicate_secret};
use crate::validation::version_validator::VersionValidator;
use secrecy::SecretString;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Artifact repository kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    Snapshot,
    Release,
}

impl RepositoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryKind::Snapshot => "snapshot",
            RepositoryKind::Release => "release",
        }
    }

    /// URL of this repository within a complete credential set
    pub fn url<'a>(&self, credentials: &CompleteCredentials<'a>) -> &'a str {
        match self {
            RepositoryKind::Snapshot => credentials.snapshot_url,
            RepositoryKind::Release => credentials.release_url,
        }
    }
}

impl std::fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of publish-target resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDecision {
    Disabled,
    Enabled(RepositoryKind),
}

impl PublishDecision {
    pub fn is_enabled(&self) -> bool {
        matches!(self, PublishDecision::Enabled(_))
    }

    /// Target repository; `None` when publishing is disabled
    pub fn target(&self) -> Option<RepositoryKind> {
        match self {
            PublishDecision::Enabled(kind) => Some(*kind),
            PublishDecision::Disabled => None,
        }
    }
}

impl Serialize for PublishDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PublishDecision", 2)?;
        state.serialize_field("enabled", &self.is_enabled())?;
        match self.target() {
            Some(kind) => state.serialize_field("targetRepository", &kind)?,
            None => state.skip_field("targetRepository")?,
        }
        state.end()
    }
}

/// Repository a module's publishable artifact is wired to
#[derive(Debug, Serialize)]
pub struct PublishWiring {
    pub repository: RepositoryKind,
    pub url: String,
    pub username: String,
    #[serde(skip)]
    pub password: SecretString,
}

impl PublishWiring {
    /// Wire `repository` using the accounts in `credentials`
    pub fn new(repository: RepositoryKind, credentials: &CompleteCredentials<'_>) -> Self {
        Self {
            repository,
            url: repository.url(credentials).to_string(),
            username: credentials.username.to_string(),
            password: duplicate_secret(credentials.password),
        }
    }
}

impl Clone for PublishWiring {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository,
            url: self.url.clone(),
            username: self.username.clone(),
            password: duplicate_secret(&self.password),
        }
    }
}

/// Decides whether and where a module is published
#[derive(Debug, Clone, Default)]
pub struct PublishTargetResolver {
    versions: VersionValidator,
}

impl PublishTargetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom snapshot marker instead of `SNAPSHOT`
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            versions: VersionValidator::with_marker(marker),
        }
    }

    /// Resolve the publish decision for one module
    ///
    /// Incomplete credentials disable publishing without error. With a complete
    /// set, versions carrying the snapshot marker go to the snapshot
    /// repository and everything else, including empty or malformed
    /// versions, goes to the release repository.
    ///
    /// # Examples
    ///
    /// ```
    /// use build_propagator::publishing::{PublishDecision, PublishTargetResolver, RepositoryKind};
    /// use build_propagator::security::{CredentialKeys, CredentialSet, StaticCredentialProvider};
    ///
    /// let provider = StaticCredentialProvider::new()
    ///     .with("NEXUS_URL_SNAPSHOT", "https://repo.example.com/snapshots")
    ///     .with("NEXUS_URL_RELEASE", "https://repo.example.com/releases")
    ///     .with("NEXUS_USERNAME", "deployer")
    ///     .with("NEXUS_PASSWORD", "secret");
    /// let credentials = CredentialSet::from_provider(&provider, &CredentialKeys::default());
    ///
    /// let resolver = PublishTargetResolver::new();
    /// assert_eq!(
    ///     resolver.resolve("1.0.0-SNAPSHOT", &credentials),
    ///     PublishDecision::Enabled(RepositoryKind::Snapshot)
    /// );
    /// assert_eq!(
    ///     resolver.resolve("1.0.0", &CredentialSet::empty()),
    ///     PublishDecision::Disabled
    /// );
    /// ```
    pub fn resolve(&self, version: &str, credentials: &CredentialSet) -> PublishDecision {
        if !credentials.is_complete() {
            return PublishDecision::Disabled;
        }

        if self.versions.is_snapshot(version) {
            PublishDecision::Enabled(RepositoryKind::Snapshot)
        } else {
            PublishDecision::Enabled(RepositoryKind::Release)
        }
    }

    /// Resolve and, when enabled, build the repository wiring
    pub fn wire(&self, version: &str, credentials: &CredentialSet) -> (PublishDecision, Option<PublishWiring>) {
        let decision = self.resolve(version, credentials);
        let wiring = match (decision.target(), credentials.complete()) {
            (Some(kind), Some(complete)) => Some(PublishWiring::new(kind, &complete)),
            _ => None,
        };
        (decision, wiring)
    }
}
