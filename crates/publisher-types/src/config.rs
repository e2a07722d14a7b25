//! Workflow Input Configuration
//!
//! The payload an operator submits to start a run: which design nodes to
//! publish and the optional targets for generation, repository, catalog and
//! hosting deploy. Every target is optional so a run can be started with a
//! partial configuration; steps that need a missing credential fail fast.

use serde::{Deserialize, Serialize};

/// Default branch that pull requests target
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Default hosted catalog endpoint
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:5174";

/// Input payload for a single workflow run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Scene-graph node ids selected for publishing
    pub components: Vec<String>,
    /// Code-generation delegate settings
    #[serde(default)]
    pub generation: GenerationTarget,
    /// Git hosting repository
    #[serde(default)]
    pub repository: RepositoryTarget,
    /// Hosted component catalog
    #[serde(default)]
    pub catalog: CatalogTarget,
    /// Hosting deploy settings
    #[serde(default)]
    pub deploy: DeployTarget,
}

impl WorkflowConfig {
    /// Create a config for the given component ids with no targets configured
    pub fn new(components: Vec<String>) -> Self {
        Self {
            components,
            ..Default::default()
        }
    }

    /// Set repository target and return self for chaining
    pub fn with_repository(mut self, repository: RepositoryTarget) -> Self {
        self.repository = repository;
        self
    }

    /// Set generation target and return self for chaining
    pub fn with_generation(mut self, generation: GenerationTarget) -> Self {
        self.generation = generation;
        self
    }

    /// Set catalog target and return self for chaining
    pub fn with_catalog(mut self, catalog: CatalogTarget) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set deploy target and return self for chaining
    pub fn with_deploy(mut self, deploy: DeployTarget) -> Self {
        self.deploy = deploy;
        self
    }
}

/// Code-generation delegate settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTarget {
    /// API key forwarded to the generation delegate; absent means templates only
    pub api_key: Option<String>,
}

impl GenerationTarget {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// Whether a generation delegate can be asked at all
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Git hosting repository and credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryTarget {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub name: Option<String>,
    /// Branch pull requests are opened against (defaults to `main`)
    pub base_branch: Option<String>,
}

/// Borrowed view of a fully configured repository target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryCredentials<'a> {
    pub token: &'a str,
    pub owner: &'a str,
    pub name: &'a str,
}

impl RepositoryTarget {
    pub fn new(token: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            owner: Some(owner.into()),
            name: Some(name.into()),
            base_branch: None,
        }
    }

    /// Token, owner and repository name, if all three are present and non-empty
    pub fn credentials(&self) -> Option<RepositoryCredentials<'_>> {
        let token = non_empty(self.token.as_deref())?;
        let owner = non_empty(self.owner.as_deref())?;
        let name = non_empty(self.name.as_deref())?;
        Some(RepositoryCredentials { token, owner, name })
    }

    pub fn base_branch(&self) -> &str {
        non_empty(self.base_branch.as_deref()).unwrap_or(DEFAULT_BASE_BRANCH)
    }

    /// `owner/name` slug, with empty segments when unset
    pub fn slug(&self) -> String {
        format!(
            "{}/{}",
            self.owner.as_deref().unwrap_or_default(),
            self.name.as_deref().unwrap_or_default()
        )
    }
}

/// Hosted component catalog target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTarget {
    pub url: Option<String>,
    pub email: Option<String>,
    pub project_id: Option<String>,
    /// Explicit version label; a timestamp label is used when absent
    pub version: Option<String>,
    /// Make the published version the project's default
    #[serde(default)]
    pub set_default: bool,
}

impl CatalogTarget {
    pub fn new(email: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            project_id: Some(project_id.into()),
            ..Default::default()
        }
    }

    /// Publishing is skipped unless both project id and account email are set
    pub fn is_configured(&self) -> bool {
        non_empty(self.project_id.as_deref()).is_some() && non_empty(self.email.as_deref()).is_some()
    }

    pub fn base_url(&self) -> &str {
        non_empty(self.url.as_deref()).unwrap_or(DEFAULT_CATALOG_URL)
    }

    /// Trimmed explicit version label, if any
    pub fn explicit_version(&self) -> Option<&str> {
        non_empty(self.version.as_deref()).map(str::trim)
    }
}

/// Hosting deploy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployTarget {
    pub token: Option<String>,
    pub framework: String,
    pub build_command: String,
    pub output_directory: String,
}

impl Default for DeployTarget {
    fn default() -> Self {
        Self {
            token: None,
            framework: "react".to_string(),
            build_command: "npm run build".to_string(),
            output_directory: "dist".to_string(),
        }
    }
}

impl DeployTarget {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn token(&self) -> Option<&str> {
        non_empty(self.token.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
