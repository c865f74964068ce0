//! Client configuration.

use serde::{Deserialize, Serialize};

/// Defaults applied when a call leaves a coordinate out.
///
/// Loading this from files or the environment is up to the embedding
/// application; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Version used when a fetch by coordinates omits one.
    pub default_version: Option<String>,
    /// Project launches go to when none is given.
    pub default_project: Option<String>,
    /// Domain launches go to when none is given.
    pub default_domain: Option<String>,
}

impl ClientConfig {
    /// Set the default version.
    #[must_use]
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = Some(version.into());
        self
    }

    /// Set the default project.
    #[must_use]
    pub fn with_default_project(mut self, project: impl Into<String>) -> Self {
        self.default_project = Some(project.into());
        self
    }

    /// Set the default domain.
    #[must_use]
    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = Some(domain.into());
        self
    }
}
