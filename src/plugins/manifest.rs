use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Field, json_kind};
use crate::report::{Diagnostic, Reporter, RuleCategory};
use crate::rules;

pub(crate) const PLUGIN_CONFIG_DIR: &str = ".claude-plugin";
pub(crate) const PLUGIN_MANIFEST_FILE: &str = "plugin.json";

const CATEGORY: RuleCategory = RuleCategory::Manifest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    Detailed(PluginAuthor),
    Plain(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRepository {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryField {
    Detailed(PluginRepository),
    Url(String),
}

/// `.claude-plugin/plugin.json`. Fields are decoded one by one so a partial or
/// mistyped manifest can still be scored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginManifest {
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub description: Field<String>,
    #[serde(default)]
    pub version: Field<String>,
    #[serde(default)]
    pub author: Field<AuthorField>,
    #[serde(default)]
    pub keywords: Field<Vec<String>>,
    #[serde(default)]
    pub repository: Field<RepositoryField>,
    #[serde(default)]
    pub license: Field<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl PluginManifest {
    /// Fails only when `content` is not JSON or not a JSON object.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(content).map_err(ManifestError::Json)?;
        if !value.is_object() {
            return Err(ManifestError::NotAnObject(json_kind(&value)));
        }
        Self::deserialize(&value).map_err(ManifestError::Json)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.text()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid manifest JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("manifest must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestValidator;

impl ManifestValidator {
    pub fn new() -> Self {
        Self
    }

    /// Decodes and validates `content`. A document that is not a JSON object
    /// yields exactly one error and `None`.
    pub fn validate_document(
        &self,
        content: &str,
        subject: &str,
        reporter: &Reporter,
    ) -> Option<PluginManifest> {
        match PluginManifest::parse(content) {
            Ok(manifest) => {
                self.validate(&manifest, subject, reporter);
                Some(manifest)
            }
            Err(e) => {
                reporter.record(Diagnostic::error(CATEGORY, subject, e.to_string()));
                None
            }
        }
    }

    pub fn validate(&self, manifest: &PluginManifest, subject: &str, reporter: &Reporter) {
        let before = reporter.len();
        let warn = |message: String| reporter.record(Diagnostic::warning(CATEGORY, subject, message));
        let wrong_type = |field: &str, expected: &str, found: &str| {
            warn(format!("'{field}' should be {expected}, found {found}"))
        };

        match (&manifest.name, manifest.name()) {
            (Field::Malformed(value), _) => reporter.record(Diagnostic::error(
                CATEGORY,
                subject,
                format!(
                    "missing required field 'name' (expected a string, found {})",
                    json_kind(value)
                ),
            )),
            (_, None) => reporter.record(Diagnostic::error(
                CATEGORY,
                subject,
                "missing required field 'name'",
            )),
            (_, Some(name)) if !rules::is_identifier(name) => warn(format!(
                "name '{name}' should be kebab-case (lowercase letters, digits and single hyphens)"
            )),
            _ => {}
        }

        match &manifest.description {
            Field::Malformed(value) => wrong_type("description", "a string", json_kind(value)),
            field if field.text().is_none() => {
                warn("missing recommended field 'description'".into())
            }
            _ => {}
        }

        match (&manifest.version, manifest.version.text()) {
            (Field::Malformed(value), _) => {
                wrong_type("version", "a version string", json_kind(value))
            }
            (_, None) => warn("missing recommended field 'version'".into()),
            (_, Some(version)) if !rules::is_semver(version) => warn(format!(
                "version '{version}' is not a semantic version (expected MAJOR.MINOR.PATCH)"
            )),
            _ => {}
        }

        match &manifest.author {
            Field::Absent => warn("missing recommended field 'author'".into()),
            Field::Malformed(Value::Object(_)) => {
                warn("author fields 'name', 'email' and 'url' should be strings".into())
            }
            Field::Malformed(value) => wrong_type(
                "author",
                "an object with 'name' and 'email'",
                json_kind(value),
            ),
            Field::Present(AuthorField::Plain(_)) => {
                warn("author should be an object with 'name' and 'email'".into())
            }
            Field::Present(AuthorField::Detailed(author)) => {
                if present(&author.name).is_none() {
                    warn("author is missing 'name'".into());
                }
                if present(&author.email).is_none() {
                    warn("author is missing 'email'".into());
                }
            }
        }

        match &manifest.keywords {
            Field::Absent => warn("missing 'keywords' (used for discoverability)".into()),
            Field::Malformed(value) => {
                wrong_type("keywords", "an array of strings", json_kind(value))
            }
            Field::Present(keywords) if keywords.iter().all(|k| k.trim().is_empty()) => {
                warn("'keywords' is empty".into())
            }
            Field::Present(_) => {}
        }

        match &manifest.repository {
            Field::Absent => warn("missing 'repository'".into()),
            Field::Malformed(Value::Object(_)) => {
                warn("repository fields 'type' and 'url' should be strings".into())
            }
            Field::Malformed(value) => wrong_type(
                "repository",
                "an object with 'type' and 'url'",
                json_kind(value),
            ),
            Field::Present(RepositoryField::Url(_)) => {
                warn("repository should be an object with 'type' and 'url'".into())
            }
            Field::Present(RepositoryField::Detailed(repo)) => {
                if present(&repo.kind).is_none() {
                    warn("repository is missing 'type'".into());
                }
                if present(&repo.url).is_none() {
                    warn("repository is missing 'url'".into());
                }
            }
        }

        match &manifest.license {
            Field::Malformed(value) => wrong_type("license", "a string", json_kind(value)),
            field if field.text().is_none() => warn("missing 'license'".into()),
            _ => {}
        }

        if reporter.len() == before {
            reporter.record(Diagnostic::success(CATEGORY, subject, "manifest is complete"));
        }
    }
}

/// A plugin directory found during discovery.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub(crate) root_dir: PathBuf,
    pub(crate) base_dir: PathBuf,
}

impl PluginDescriptor {
    pub(crate) fn new(root_dir: PathBuf, base_dir: PathBuf) -> Self {
        Self { root_dir, base_dir }
    }

    /// Directory name, used until the manifest has been read.
    pub fn dir_name(&self) -> String {
        self.root_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root_dir.display().to_string())
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Subject string for diagnostics about `path`, relative to the scanned
    /// root.
    pub fn subject(&self, path: &Path) -> String {
        crate::common::display_path(path, &self.base_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root_dir.join(PLUGIN_CONFIG_DIR).join(PLUGIN_MANIFEST_FILE)
    }

    pub fn skills_dir(&self) -> PathBuf {
        self.root_dir.join("skills")
    }

    pub fn commands_dir(&self) -> PathBuf {
        self.root_dir.join("commands")
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.root_dir.join("agents")
    }

    pub fn hooks_dir(&self) -> PathBuf {
        self.root_dir.join("hooks")
    }

    pub fn hooks_config_path(&self) -> PathBuf {
        self.hooks_dir().join("hooks.json")
    }

    /// Reads and validates the plugin's manifest. Returns the manifest name
    /// when one could be decoded.
    pub async fn validate_manifest(&self, reporter: &Reporter) -> Option<String> {
        let path = self.manifest_path();
        let subject = self.subject(&path);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                reporter.record(Diagnostic::error(
                    CATEGORY,
                    subject,
                    format!("missing manifest {PLUGIN_CONFIG_DIR}/{PLUGIN_MANIFEST_FILE}"),
                ));
                return None;
            }
            Err(e) => {
                reporter.record(Diagnostic::error(
                    CATEGORY,
                    subject,
                    format!("failed to read manifest: {e}"),
                ));
                return None;
            }
        };

        let manifest = ManifestValidator::new().validate_document(&content, &subject, reporter)?;
        let name = manifest.name()?.to_string();

        let dir_name = self.dir_name();
        if name != dir_name {
            reporter.record(Diagnostic::warning(
                CATEGORY,
                subject,
                format!("manifest name '{name}' does not match directory name '{dir_name}'"),
            ));
        }
        Some(name)
    }
}
