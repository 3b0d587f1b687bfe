//! Agent and slash-command document checks.
//!
//! `agents/*.md` must open with frontmatter declaring `name` and
//! `description`. `commands/*.md` may omit frontmatter entirely, but a block
//! that is opened has to be closed, and should carry a `description`.

use std::path::Path;

use crate::common::{FrontmatterError, FrontmatterFields, is_markdown, list_entries, split_frontmatter};
use crate::plugins::PluginDescriptor;
use crate::report::{Diagnostic, Reporter, RuleCategory};

const CATEGORY: RuleCategory = RuleCategory::Documents;

/// Which kind of markdown document is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Agent,
    Command,
}

impl DocumentKind {
    fn label(&self) -> &'static str {
        match self {
            DocumentKind::Agent => "agent",
            DocumentKind::Command => "command",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentValidator;

impl DocumentValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_document(
        &self,
        kind: DocumentKind,
        content: &str,
        subject: &str,
        reporter: &Reporter,
    ) {
        let before = reporter.len();

        let fields = match (split_frontmatter(content), kind) {
            (Ok(block), _) => FrontmatterFields::parse(block.raw),
            (Err(FrontmatterError::Missing), DocumentKind::Command) => {
                reporter.record(Diagnostic::warning(
                    CATEGORY,
                    subject,
                    "command has no frontmatter; add a 'description' so it shows up in /help",
                ));
                return;
            }
            (Err(e), _) => {
                reporter.record(Diagnostic::error(CATEGORY, subject, e.to_string()));
                return;
            }
        };

        if let Some(yaml_error) = &fields.yaml_error {
            reporter.record(Diagnostic::warning(
                CATEGORY,
                subject,
                format!("frontmatter is not valid YAML ({yaml_error}); read as plain key: value lines"),
            ));
        }

        let has = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        match kind {
            DocumentKind::Agent => {
                if !has(&fields.name) {
                    reporter.record(Diagnostic::error(
                        CATEGORY,
                        subject,
                        "agent is missing required field 'name'",
                    ));
                }
                if !has(&fields.description) {
                    reporter.record(Diagnostic::error(
                        CATEGORY,
                        subject,
                        "agent is missing required field 'description'",
                    ));
                }
            }
            DocumentKind::Command => {
                if !has(&fields.description) {
                    reporter.record(Diagnostic::warning(
                        CATEGORY,
                        subject,
                        "command is missing recommended field 'description'",
                    ));
                }
            }
        }

        if reporter.len() == before {
            reporter.record(Diagnostic::success(
                CATEGORY,
                subject,
                format!("{} frontmatter is valid", kind.label()),
            ));
        }
    }

    /// Checks every markdown file directly under `agents/` and `commands/`.
    pub async fn validate_plugin(&self, plugin: &PluginDescriptor, reporter: &Reporter) {
        for (kind, dir) in [
            (DocumentKind::Agent, plugin.agents_dir()),
            (DocumentKind::Command, plugin.commands_dir()),
        ] {
            let files = match list_entries(&dir, is_markdown).await {
                Ok(files) => files,
                Err(e) => {
                    reporter.record(Diagnostic::error(
                        CATEGORY,
                        plugin.subject(&dir),
                        format!("failed to read {} directory: {e}", kind.label()),
                    ));
                    continue;
                }
            };
            for file in files {
                self.validate_file(kind, plugin, &file, reporter).await;
            }
        }
    }

    async fn validate_file(
        &self,
        kind: DocumentKind,
        plugin: &PluginDescriptor,
        path: &Path,
        reporter: &Reporter,
    ) {
        let subject = plugin.subject(path);
        match tokio::fs::read_to_string(path).await {
            Ok(content) => self.validate_document(kind, &content, &subject, reporter),
            Err(e) => reporter.record(Diagnostic::error(
                CATEGORY,
                subject,
                format!("failed to read {}: {e}", kind.label()),
            )),
        }
    }
}
