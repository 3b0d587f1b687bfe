//! Marketplace index (`.claude-plugin/marketplace.json`) validation.
//!
//! The index lists every plugin the marketplace publishes. Beyond the
//! per-entry field checks, entries are cross-checked against each other and
//! against the plugins discovered on disk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Field, json_kind};
use crate::plugins::{AuthorField, PLUGIN_CONFIG_DIR};
use crate::report::{Diagnostic, Reporter, RuleCategory};

pub const MARKETPLACE_FILE: &str = "marketplace.json";

const CATEGORY: RuleCategory = RuleCategory::Marketplace;

/// Top-level index document. Entries are kept raw so that one malformed
/// entry does not hide the others.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketplaceIndex {
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub plugins: Field<Vec<Value>>,
}

/// Where the host fetches a plugin from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSource {
    /// Path relative to the marketplace root, e.g. `./plugins/foo`.
    Path(String),
    /// Structured remote source such as `{"source": "github", "repo": "..."}`.
    Remote(serde_json::Map<String, Value>),
}

impl PluginSource {
    /// Relative path for sources that live inside this repository.
    pub fn local_path(&self) -> Option<&str> {
        match self {
            PluginSource::Path(path) if !path.contains("://") && !path.starts_with("git@") => {
                Some(path.as_str())
            }
            _ => None,
        }
    }
}

/// One element of `plugins`. Each field decodes on its own, so a mistyped
/// optional field never hides the entry's name from the cross-checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketplaceEntry {
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub source: Field<PluginSource>,
    #[serde(default)]
    pub version: Field<String>,
    #[serde(default)]
    pub author: Field<AuthorField>,
    #[serde(default)]
    pub category: Field<String>,
}

/// State of one recommended metadata field of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataIssue {
    Missing(&'static str),
    WrongType {
        field: &'static str,
        found: &'static str,
    },
}

impl MarketplaceEntry {
    fn name(&self) -> Option<&str> {
        self.name.text()
    }

    /// Recommended metadata fields this entry lacks or carries with the
    /// wrong type.
    pub fn metadata_issues(&self) -> Vec<MetadataIssue> {
        fn check<T>(
            field: &'static str,
            value: &Field<T>,
            blank: impl Fn(&T) -> bool,
        ) -> Option<MetadataIssue> {
            match value {
                Field::Absent => Some(MetadataIssue::Missing(field)),
                Field::Malformed(raw) => Some(MetadataIssue::WrongType {
                    field,
                    found: json_kind(raw),
                }),
                Field::Present(v) if blank(v) => Some(MetadataIssue::Missing(field)),
                Field::Present(_) => None,
            }
        }

        let blank_text = |s: &String| s.trim().is_empty();
        [
            check("version", &self.version, blank_text),
            check("author", &self.author, |_| false),
            check("category", &self.category, blank_text),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn marketplace_path(root: &Path) -> PathBuf {
    root.join(PLUGIN_CONFIG_DIR).join(MARKETPLACE_FILE)
}

#[derive(Debug, Clone)]
pub struct MarketplaceValidator {
    root: PathBuf,
    known_plugins: Option<BTreeSet<String>>,
}

impl MarketplaceValidator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            known_plugins: None,
        }
    }

    /// Plugin names found on disk. Enables the cross-checks between the
    /// index and the plugin tree.
    pub fn with_known_plugins(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.known_plugins = Some(names.into_iter().collect());
        self
    }

    /// Reads and checks the index. An absent index is informational; an
    /// index that exists but cannot be read is fatal.
    pub async fn validate(&self, reporter: &Reporter) -> crate::Result<()> {
        let path = marketplace_path(&self.root);
        let subject = crate::common::display_path(&path, &self.root);

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                self.validate_document(&content, &subject, reporter).await;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no marketplace index");
                reporter.record(Diagnostic::info(
                    CATEGORY,
                    subject,
                    "no marketplace index; skipping marketplace checks",
                ));
                Ok(())
            }
            Err(source) => Err(crate::Error::MarketplaceUnreadable { path, source }),
        }
    }

    pub async fn validate_document(&self, content: &str, subject: &str, reporter: &Reporter) {
        let error = |message: String| reporter.record(Diagnostic::error(CATEGORY, subject, message));
        let warn = |message: String| reporter.record(Diagnostic::warning(CATEGORY, subject, message));
        let before = reporter.len();

        let value: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(e) => {
                error(format!("invalid marketplace index: {e}"));
                return;
            }
        };
        if !value.is_object() {
            error(format!(
                "marketplace index must be a JSON object, found {}",
                json_kind(&value)
            ));
            return;
        }
        let index = match MarketplaceIndex::deserialize(&value) {
            Ok(index) => index,
            Err(e) => {
                error(format!("invalid marketplace index: {e}"));
                return;
            }
        };

        match &index.name {
            Field::Malformed(raw) => error(format!(
                "missing required field 'name' (expected a string, found {})",
                json_kind(raw)
            )),
            field if field.text().is_none() => error("missing required field 'name'".into()),
            _ => {}
        }
        let raw_entries = match index.plugins {
            Field::Present(entries) => entries,
            Field::Absent => {
                error("missing required field 'plugins'".into());
                return;
            }
            Field::Malformed(raw) => {
                error(format!(
                    "missing required field 'plugins' (expected an array, found {})",
                    json_kind(&raw)
                ));
                return;
            }
        };

        let mut incomplete = 0usize;
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        let mut listed = BTreeSet::new();

        for (i, raw) in raw_entries.into_iter().enumerate() {
            if !raw.is_object() {
                error(format!(
                    "plugins[{i}]: entry must be an object, found {}",
                    json_kind(&raw)
                ));
                continue;
            }
            let entry = match MarketplaceEntry::deserialize(&raw) {
                Ok(entry) => entry,
                Err(e) => {
                    error(format!("plugins[{i}]: invalid entry: {e}"));
                    continue;
                }
            };

            let label = match (&entry.name, entry.name()) {
                (_, Some(name)) => format!("plugin '{name}'"),
                (Field::Malformed(raw), None) => {
                    error(format!(
                        "plugins[{i}]: missing required field 'name' (expected a string, found {})",
                        json_kind(raw)
                    ));
                    format!("plugins[{i}]")
                }
                (_, None) => {
                    error(format!("plugins[{i}]: missing required field 'name'"));
                    format!("plugins[{i}]")
                }
            };

            match &entry.source {
                Field::Absent => error(format!("{label}: missing required field 'source'")),
                Field::Malformed(raw) => error(format!(
                    "{label}: missing required field 'source' (expected a path or an object, found {})",
                    json_kind(raw)
                )),
                Field::Present(source) => {
                    if let Some(path) = source.local_path()
                        && !tokio::fs::try_exists(self.root.join(path))
                            .await
                            .unwrap_or(false)
                    {
                        error(format!("{label}: source path '{path}' does not exist"));
                    }
                }
            }

            let issues = entry.metadata_issues();
            for issue in &issues {
                match issue {
                    MetadataIssue::Missing(field) => {
                        warn(format!("{label}: missing recommended field '{field}'"))
                    }
                    MetadataIssue::WrongType { field, found } => {
                        warn(format!("{label}: '{field}' has the wrong type ({found})"))
                    }
                }
            }
            if !issues.is_empty() {
                incomplete += 1;
            }

            if let Some(name) = entry.name() {
                if let Some(first) = seen.get(name) {
                    error(format!(
                        "{label}: duplicate entry (first listed at plugins[{first}])"
                    ));
                } else {
                    seen.insert(name.to_string(), i);
                }
                listed.insert(name.to_string());
            }
        }

        if incomplete > 0 {
            warn(format!(
                "{incomplete} plugin entr{} with incomplete metadata (version, author, category)",
                if incomplete == 1 { "y" } else { "ies" }
            ));
        }

        if let Some(known) = &self.known_plugins {
            for name in listed.difference(known) {
                warn(format!(
                    "plugin '{name}' is listed but no plugin with that manifest name was found"
                ));
            }
            for name in known.difference(&listed) {
                warn(format!("plugin '{name}' has no marketplace entry"));
            }
        }

        if reporter.len() == before {
            reporter.record(Diagnostic::success(
                CATEGORY,
                subject,
                format!("{} plugin entries are complete", seen.len()),
            ));
        }
    }
}
