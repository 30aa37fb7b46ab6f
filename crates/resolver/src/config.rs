use crate::{ResolveError, Result};
use dossier_naming::DEFAULT_FUZZY_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_WORKSPACE_REF: &str = "dossier.workspace_quality_dossiers";
pub const DEFAULT_WORKSPACE_ALIAS_REF: &str = "dossier.folder_root_quality_dossiers";
pub const DEFAULT_EXCLUDE_REF: &str = "dossier.folder_archived";
pub const DEFAULT_YEAR_REF_PREFIX: &str = "dossier.folder_year_";

/// Where the resolver looks and how loosely it matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Symbolic identifier of the workspace root
    pub workspace_ref: String,

    /// Secondary identifier bound to the same root
    pub workspace_alias_ref: String,

    /// Symbolic identifier of the excluded (archived) subtree
    pub exclude_ref: Option<String>,

    /// Prefix of the per-year folder identifiers (`<prefix>2024`)
    pub year_ref_prefix: String,

    pub fuzzy_threshold: f64,

    /// Maximum number of folders returned by suggestions
    pub suggest_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            workspace_ref: DEFAULT_WORKSPACE_REF.to_string(),
            workspace_alias_ref: DEFAULT_WORKSPACE_ALIAS_REF.to_string(),
            exclude_ref: Some(DEFAULT_EXCLUDE_REF.to_string()),
            year_ref_prefix: DEFAULT_YEAR_REF_PREFIX.to_string(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            suggest_limit: 10,
        }
    }
}

impl ResolverConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self =
            toml::from_str(raw).map_err(|err| ResolveError::InvalidConfig(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workspace_ref.trim().is_empty() {
            return Err(ResolveError::InvalidConfig(
                "workspace_ref must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ResolveError::InvalidConfig(format!(
                "fuzzy_threshold {} is outside 0..=1",
                self.fuzzy_threshold
            )));
        }
        if self.suggest_limit == 0 {
            return Err(ResolveError::InvalidConfig(
                "suggest_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Exclusion identifier, ignoring blank values.
    pub fn exclude_ref(&self) -> Option<&str> {
        self.exclude_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    pub fn year_ref(&self, year: i32) -> String {
        format!("{}{year}", self.year_ref_prefix)
    }
}
