use std::path::Path;

use crate::common::{FrontmatterFields, is_skill_file, list_entries, split_frontmatter};
use crate::plugins::PluginDescriptor;
use crate::report::{Diagnostic, Reporter, RuleCategory};
use crate::rules::{self, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MIN_DESCRIPTION_LENGTH};

const CATEGORY: RuleCategory = RuleCategory::Skills;
const SKILL_FILE: &str = "SKILL.md";

/// Checks the frontmatter block at the top of a skill document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillValidator;

impl SkillValidator {
    pub fn new() -> Self {
        Self
    }

    /// `expected_name` is the name implied by the file location (the skill
    /// directory), if any.
    pub fn validate_document(
        &self,
        content: &str,
        subject: &str,
        expected_name: Option<&str>,
        reporter: &Reporter,
    ) {
        let error = |message: String| reporter.record(Diagnostic::error(CATEGORY, subject, message));
        let warn = |message: String| reporter.record(Diagnostic::warning(CATEGORY, subject, message));
        let before = reporter.len();

        let block = match split_frontmatter(content) {
            Ok(block) => block,
            Err(e) => {
                error(e.to_string());
                return;
            }
        };

        let fields = FrontmatterFields::parse(block.raw);
        if let Some(yaml_error) = &fields.yaml_error {
            warn(format!(
                "frontmatter is not valid YAML ({yaml_error}); read as plain key: value lines"
            ));
        }

        match fields.name.as_deref().filter(|n| !n.is_empty()) {
            None => error("missing required field 'name'".into()),
            Some(name) => {
                let len = rules::char_len(name);
                if len > MAX_NAME_LENGTH {
                    error(format!(
                        "name is {len} characters; the maximum is {MAX_NAME_LENGTH}"
                    ));
                }
                if !rules::is_identifier(name) {
                    warn(format!(
                        "name '{name}' should be kebab-case (lowercase letters, digits and single hyphens)"
                    ));
                }
                if let Some(expected) = expected_name
                    && expected != name
                {
                    warn(format!(
                        "name '{name}' does not match its directory '{expected}'"
                    ));
                }
            }
        }

        match fields.description.as_deref().filter(|d| !d.is_empty()) {
            None => error("missing required field 'description'".into()),
            Some(description) => {
                let len = rules::char_len(description);
                if len > MAX_DESCRIPTION_LENGTH {
                    warn(format!(
                        "description is {len} characters; the maximum is {MAX_DESCRIPTION_LENGTH}"
                    ));
                } else if len < MIN_DESCRIPTION_LENGTH {
                    warn(format!(
                        "description is only {len} characters; likely insufficient activation signal (aim for at least {MIN_DESCRIPTION_LENGTH})"
                    ));
                }
            }
        }

        let clean = reporter.len() == before;

        if let Some(tools) = &fields.allowed_tools {
            reporter.record(Diagnostic::info(
                CATEGORY,
                subject,
                format!("allowed-tools: {}", tools.join(", ")),
            ));
        }

        if clean {
            reporter.record(Diagnostic::success(CATEGORY, subject, "frontmatter is valid"));
        }
    }

    /// Validates `skills/<name>/SKILL.md` and `skills/*.skill.md` of a plugin.
    pub async fn validate_plugin(&self, plugin: &PluginDescriptor, reporter: &Reporter) {
        let skills_dir = plugin.skills_dir();
        let entries = match list_entries(&skills_dir, |_, _| true).await {
            Ok(entries) => entries,
            Err(e) => {
                reporter.record(Diagnostic::error(
                    CATEGORY,
                    plugin.subject(&skills_dir),
                    format!("failed to read skills directory: {e}"),
                ));
                return;
            }
        };

        for entry in entries {
            let is_dir = tokio::fs::metadata(&entry)
                .await
                .is_ok_and(|m| m.is_dir());
            if is_dir {
                let skill_file = entry.join(SKILL_FILE);
                let has_skill_file = tokio::fs::metadata(&skill_file)
                    .await
                    .is_ok_and(|m| m.is_file());
                if !has_skill_file {
                    reporter.record(Diagnostic::warning(
                        CATEGORY,
                        plugin.subject(&entry),
                        format!("skill directory has no {SKILL_FILE}"),
                    ));
                    continue;
                }
                let expected = entry.file_name().and_then(|n| n.to_str());
                self.validate_file(plugin, &skill_file, expected, reporter)
                    .await;
            } else if is_skill_file(&entry) {
                let expected = entry
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_suffix(".skill.md"));
                self.validate_file(plugin, &entry, expected, reporter).await;
            }
        }
    }

    async fn validate_file(
        &self,
        plugin: &PluginDescriptor,
        path: &Path,
        expected_name: Option<&str>,
        reporter: &Reporter,
    ) {
        let subject = plugin.subject(path);
        match tokio::fs::read_to_string(path).await {
            Ok(content) => self.validate_document(&content, &subject, expected_name, reporter),
            Err(e) => reporter.record(Diagnostic::error(
                CATEGORY,
                subject,
                format!("failed to read skill: {e}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunReport;
    use crate::report::Severity;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const GOOD_DESCRIPTION: &str =
        "Extracts text and tables from PDF files. Use when the user asks about PDF content.";

    fn validate(content: &str) -> RunReport {
        let reporter = Reporter::new();
        SkillValidator::new().validate_document(content, "SKILL.md", None, &reporter);
        reporter.finalize()
    }

    #[test]
    fn test_valid_skill() {
        let report = validate(&format!(
            "---\nname: pdf-tools\ndescription: {GOOD_DESCRIPTION}\n---\n# PDF tools\n"
        ));
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.counts().successes, 1);
    }

    #[test]
    fn test_short_description_single_warning() {
        let report = validate("---\nname: x\ndescription: short desc\n---\nBody");
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
        let warning = report.with_severity(Severity::Warning).next().unwrap();
        assert!(warning.message.contains("activation signal"));
    }

    #[test]
    fn test_description_bounds() {
        let at_min = "d".repeat(MIN_DESCRIPTION_LENGTH);
        let at_max = "d".repeat(MAX_DESCRIPTION_LENGTH);
        for description in [&at_min, &at_max] {
            let report = validate(&format!("---\nname: x\ndescription: {description}\n---\n"));
            assert_eq!(report.warning_count(), 0);
        }

        let too_long = "d".repeat(MAX_DESCRIPTION_LENGTH + 1);
        let report = validate(&format!("---\nname: x\ndescription: {too_long}\n---\n"));
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn test_missing_frontmatter() {
        let report = validate("# Just a heading\n");
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.diagnostics().len(), 1);
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let report = validate("---\nname: x\ndescription: something\n");
        assert_eq!(report.error_count(), 1);
        assert!(report.diagnostics()[0].message.contains("not terminated"));
    }

    #[test]
    fn test_missing_fields_are_errors() {
        let report = validate("---\nallowed-tools: Read\n---\n");
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.counts().infos, 1);
        assert_eq!(report.counts().successes, 0);
    }

    #[test]
    fn test_name_rules() {
        let long_name = "a".repeat(MAX_NAME_LENGTH + 1);
        let report = validate(&format!(
            "---\nname: {long_name}\ndescription: {GOOD_DESCRIPTION}\n---\n"
        ));
        assert_eq!(report.error_count(), 1);

        let report = validate(&format!(
            "---\nname: PDF_Tools\ndescription: {GOOD_DESCRIPTION}\n---\n"
        ));
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_allowed_tools_is_informational() {
        let report = validate(&format!(
            "---\nname: pdf-tools\ndescription: {GOOD_DESCRIPTION}\nallowed-tools: [Read, Bash]\n---\n"
        ));
        let info: Vec<_> = report.with_severity(Severity::Info).collect();
        assert_eq!(info.len(), 1);
        assert!(info[0].message.contains("Read, Bash"));
        assert_eq!(report.counts().successes, 1);
    }

    #[test]
    fn test_directory_name_mismatch() {
        let reporter = Reporter::new();
        SkillValidator::new().validate_document(
            &format!("---\nname: pdf-tools\ndescription: {GOOD_DESCRIPTION}\n---\n"),
            "SKILL.md",
            Some("pdf"),
            &reporter,
        );
        assert_eq!(reporter.finalize().warning_count(), 1);
    }

    #[tokio::test]
    async fn test_validate_plugin_skills() {
        let dir = tempdir().unwrap();
        let plugin_dir = dir.path().join("my-plugin");
        let skills = plugin_dir.join("skills");
        std::fs::create_dir_all(skills.join("pdf-tools")).unwrap();
        std::fs::create_dir_all(skills.join("empty")).unwrap();
        std::fs::write(
            skills.join("pdf-tools").join("SKILL.md"),
            format!("---\nname: pdf-tools\ndescription: {GOOD_DESCRIPTION}\n---\n"),
        )
        .unwrap();
        std::fs::write(skills.join("commit.skill.md"), "no frontmatter").unwrap();
        std::fs::write(skills.join("README.md"), "ignored").unwrap();

        let plugin = PluginDescriptor::new(plugin_dir, PathBuf::from(dir.path()));
        let reporter = Reporter::new();
        SkillValidator::new().validate_plugin(&plugin, &reporter).await;
        let report = reporter.finalize();

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.counts().successes, 1);
        assert!(
            report
                .with_severity(Severity::Error)
                .all(|d| d.subject == "my-plugin/skills/commit.skill.md")
        );
    }
}
