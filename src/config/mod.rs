//! Validator configuration.
//!
//! Resolution order, lowest to highest priority: defaults, environment
//! (`PLUGIN_VALIDATOR_*`), explicit builder calls (CLI flags).
//!
//! ```rust
//! use claude_plugin_validator::{RuleCategory, ValidatorConfig};
//!
//! let config = ValidatorConfig::new("./marketplace")
//!     .disable(RuleCategory::Permissions)
//!     .with_jobs(4);
//! assert!(!config.is_enabled(RuleCategory::Permissions));
//! ```

pub mod env;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use env::{ENV_PREFIX, EnvConfigProvider, EnvOverrides, parse_categories};

use crate::report::RuleCategory;

pub const DEFAULT_JOBS: usize = 8;

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub root: PathBuf,
    pub disabled: BTreeSet<RuleCategory>,
    /// Upper bound on plugins validated at once.
    pub jobs: usize,
    /// Report a tool-triggered binding without `matcher` as an error.
    pub strict_matcher: bool,
}

impl ValidatorConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            disabled: BTreeSet::new(),
            jobs: DEFAULT_JOBS,
            strict_matcher: false,
        }
    }

    /// Applies `PLUGIN_VALIDATOR_*` variables. Any invalid value is an
    /// [`Error::Config`](crate::Error::Config); nothing is applied in that case.
    pub fn with_env(self) -> crate::Result<Self> {
        let provider = EnvConfigProvider::default();
        self.with_env_lookup(|key| provider.get_raw(key))
    }

    /// Like [`with_env`](Self::with_env) with a custom variable source.
    pub fn with_env_lookup<F>(self, lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> crate::Result<Option<String>>,
    {
        let overrides = EnvOverrides::from_lookup(lookup)?;
        tracing::debug!(?overrides, "Environment overrides");
        Ok(self.apply(overrides))
    }

    pub fn apply(mut self, overrides: EnvOverrides) -> Self {
        if let Some(root) = overrides.root {
            self.root = PathBuf::from(root);
        }
        self.disabled.extend(overrides.skip);
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs;
        }
        if let Some(strict) = overrides.strict_matcher {
            self.strict_matcher = strict;
        }
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn disable(mut self, category: RuleCategory) -> Self {
        self.disabled.insert(category);
        self
    }

    pub fn disable_many(mut self, categories: impl IntoIterator<Item = RuleCategory>) -> Self {
        self.disabled.extend(categories);
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_strict_matcher(mut self, strict: bool) -> Self {
        self.strict_matcher = strict;
        self
    }

    pub fn is_enabled(&self, category: RuleCategory) -> bool {
        !self.disabled.contains(&category)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.jobs == 0 {
            return Err(crate::Error::Config("jobs must be at least 1".into()));
        }
        if !self.root.is_dir() {
            return Err(crate::Error::RootNotFound(self.root.clone()));
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.jobs, DEFAULT_JOBS);
        assert!(!config.strict_matcher);
        assert!(
            RuleCategory::all()
                .iter()
                .all(|c| config.is_enabled(*c))
        );
    }

    #[test]
    fn test_apply_overrides() {
        let overrides = EnvOverrides {
            root: Some("/repo".into()),
            skip: [RuleCategory::Hooks].into_iter().collect(),
            jobs: Some(2),
            strict_matcher: Some(true),
        };
        let config = ValidatorConfig::new(".").apply(overrides);
        assert_eq!(config.root, PathBuf::from("/repo"));
        assert!(!config.is_enabled(RuleCategory::Hooks));
        assert!(config.is_enabled(RuleCategory::Skills));
        assert_eq!(config.jobs, 2);
        assert!(config.strict_matcher);
    }

    #[test]
    fn test_builder_overrides_env() {
        let config = ValidatorConfig::new(".")
            .apply(EnvOverrides {
                jobs: Some(2),
                ..EnvOverrides::default()
            })
            .with_jobs(6)
            .disable_many([RuleCategory::Skills, RuleCategory::Documents]);
        assert_eq!(config.jobs, 6);
        assert!(!config.is_enabled(RuleCategory::Skills));
        assert!(!config.is_enabled(RuleCategory::Documents));
    }

    #[test]
    fn test_env_lookup_applies_overrides() {
        let config = ValidatorConfig::new(".")
            .with_env_lookup(|key| {
                Ok(match key {
                    "skip" => Some("hooks".to_string()),
                    "jobs" => Some("3".to_string()),
                    _ => None,
                })
            })
            .unwrap();
        assert!(!config.is_enabled(RuleCategory::Hooks));
        assert_eq!(config.jobs, 3);
    }

    #[test]
    fn test_bad_env_value_is_fatal() {
        let result = ValidatorConfig::new(".").with_env_lookup(|key| {
            Ok(match key {
                "skip" => Some("hook".to_string()),
                "jobs" => Some("3".to_string()),
                _ => None,
            })
        });
        assert!(matches!(result, Err(crate::Error::Config(_))));

        let result = ValidatorConfig::new(".")
            .with_env_lookup(|key| Ok((key == "strict.matcher").then(|| "maybe".to_string())));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ValidatorConfig::new(dir.path()).validate().is_ok());
        assert!(matches!(
            ValidatorConfig::new(dir.path()).with_jobs(0).validate(),
            Err(crate::Error::Config(_))
        ));
        assert!(matches!(
            ValidatorConfig::new(dir.path().join("missing")).validate(),
            Err(crate::Error::RootNotFound(_))
        ));
    }
}
