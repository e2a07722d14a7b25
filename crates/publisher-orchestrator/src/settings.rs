//! Engine Settings
//!
//! Tunables for pacing and bounded waits. Defaults match interactive use;
//! `from_env` lets a deployment override them (the runner loads `.env`
//! first).

use crate::error::{OrchestratorError, Result};
use publisher_types::BridgeRequestKind;
use std::time::Duration;
use tracing::debug;

pub const ENV_SETTLE_DELAY_MS: &str = "PUBLISHER_SETTLE_DELAY_MS";
pub const ENV_CODEGEN_TIMEOUT_SECS: &str = "PUBLISHER_CODEGEN_TIMEOUT_SECS";
pub const ENV_EXTERNAL_TIMEOUT_SECS: &str = "PUBLISHER_EXTERNAL_TIMEOUT_SECS";
pub const ENV_CATALOG_TIMEOUT_SECS: &str = "PUBLISHER_CATALOG_TIMEOUT_SECS";
pub const ENV_BRANCH_PREFIX: &str = "PUBLISHER_BRANCH_PREFIX";

/// Default prefix for branches created by a run
pub const DEFAULT_BRANCH_PREFIX: &str = "feature/figma-components-";

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Pause after every ledger transition; zero for headless use
    pub settle_delay: Duration,
    /// Bounded wait for code generation
    pub codegen_timeout: Duration,
    /// Bounded wait for commit, pull request and deploy calls
    pub external_timeout: Duration,
    /// Bounded wait for catalog publishing
    pub catalog_timeout: Duration,
    /// Branch names are `{branch_prefix}{timestamp_ms}`
    pub branch_prefix: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(800),
            codegen_timeout: BridgeRequestKind::Codegen.default_timeout(),
            external_timeout: BridgeRequestKind::Commit.default_timeout(),
            catalog_timeout: BridgeRequestKind::CatalogPublish.default_timeout(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
        }
    }
}

impl OrchestratorSettings {
    /// Settings with no pacing delay
    pub fn headless() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Defaults overridden by `PUBLISHER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(ms) = parse_u64(&lookup, ENV_SETTLE_DELAY_MS)? {
            settings.settle_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_u64(&lookup, ENV_CODEGEN_TIMEOUT_SECS)? {
            settings.codegen_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&lookup, ENV_EXTERNAL_TIMEOUT_SECS)? {
            settings.external_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&lookup, ENV_CATALOG_TIMEOUT_SECS)? {
            settings.catalog_timeout = Duration::from_secs(secs);
        }
        if let Some(prefix) = lookup(ENV_BRANCH_PREFIX).filter(|p| !p.trim().is_empty()) {
            settings.branch_prefix = prefix;
        }

        debug!("[OrchestratorSettings] Loaded: {:?}", settings);
        Ok(settings)
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| OrchestratorError::config(format!("{key}={raw:?}: {e}"))),
    }
}
