//! Environment variable configuration layer.
//!
//! Keys are dotted (`strict.matcher`) and map to upper-snake variables behind
//! a prefix (`PLUGIN_VALIDATOR_STRICT_MATCHER`). Environment variables are
//! only read, never written.

use std::collections::BTreeSet;

use crate::report::RuleCategory;

pub const ENV_PREFIX: &str = "PLUGIN_VALIDATOR_";

/// Read-only environment variable provider.
#[derive(Debug, Clone)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let key = key.to_uppercase().replace('.', "_");
        match &self.prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key,
        }
    }

    pub fn get_raw(&self, key: &str) -> crate::Result<Option<String>> {
        let env_key = self.env_key(key);
        match std::env::var(&env_key) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(crate::Error::Config(format!("{env_key}: {e}"))),
        }
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::prefixed(ENV_PREFIX)
    }
}

/// Settings picked up from the environment; `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub root: Option<String>,
    pub skip: BTreeSet<RuleCategory>,
    pub jobs: Option<usize>,
    pub strict_matcher: Option<bool>,
}

impl EnvOverrides {
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> crate::Result<Option<String>>,
    {
        let mut overrides = Self {
            root: lookup("root")?.filter(|v| !v.trim().is_empty()),
            ..Self::default()
        };

        if let Some(raw) = lookup("skip")? {
            overrides.skip = parse_categories(&raw)?;
        }

        if let Some(raw) = lookup("jobs")? {
            let jobs = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| crate::Error::Config(format!("jobs '{raw}': {e}")))?;
            overrides.jobs = Some(jobs);
        }

        if let Some(raw) = lookup("strict.matcher")? {
            overrides.strict_matcher = Some(parse_flag(&raw)?);
        }

        Ok(overrides)
    }
}

pub fn parse_categories(raw: &str) -> crate::Result<BTreeSet<RuleCategory>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<RuleCategory>().map_err(crate::Error::Config))
        .collect()
}

fn parse_flag(raw: &str) -> crate::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(crate::Error::Config(format!("expected boolean flag, got '{other}'"))),
    }
}
