use std::path::Path;

use serde_json::Value;

use super::schema::{EventBindings, HookCommand, ToolBinding};
use crate::plugins::PluginDescriptor;
use crate::report::{Diagnostic, Reporter, RuleCategory};
use crate::rules::{self, KNOWN_INTERPRETERS, PLUGIN_ROOT_VAR};

const CATEGORY: RuleCategory = RuleCategory::Hooks;

/// Checks a hook configuration document against the event-class shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookValidator {
    strict_matcher: bool,
}

struct Context<'a> {
    subject: &'a str,
    plugin_root: Option<&'a Path>,
    reporter: &'a Reporter,
}

impl Context<'_> {
    fn error(&self, message: String) {
        self.reporter
            .record(Diagnostic::error(CATEGORY, self.subject, message));
    }

    fn warning(&self, message: String) {
        self.reporter
            .record(Diagnostic::warning(CATEGORY, self.subject, message));
    }

    fn success(&self, message: String) {
        self.reporter
            .record(Diagnostic::success(CATEGORY, self.subject, message));
    }
}

fn binding_label(event: &str, index: usize, total: usize) -> String {
    if total > 1 {
        format!("{event}[{index}]")
    } else {
        event.to_string()
    }
}

impl HookValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tool-triggered binding without `matcher` becomes an error instead of
    /// a warning.
    pub fn strict_matcher(mut self, strict: bool) -> Self {
        self.strict_matcher = strict;
        self
    }

    /// Validates the plugin's `hooks/hooks.json`, if it has one.
    pub async fn validate_plugin(&self, plugin: &PluginDescriptor, reporter: &Reporter) {
        let path = plugin.hooks_config_path();
        let subject = plugin.subject(&path);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                reporter.record(Diagnostic::error(
                    CATEGORY,
                    subject,
                    format!("failed to read hook configuration: {e}"),
                ));
                return;
            }
        };

        self.validate_document(&content, &subject, Some(plugin.root_dir()), reporter)
            .await;
    }

    /// Validates hook configuration text. With `plugin_root`, scripts
    /// referenced through the root placeholder must exist under it.
    pub async fn validate_document(
        &self,
        content: &str,
        subject: &str,
        plugin_root: Option<&Path>,
        reporter: &Reporter,
    ) {
        let ctx = Context {
            subject,
            plugin_root,
            reporter,
        };

        let document: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(e) => {
                ctx.error(format!("invalid hook configuration JSON: {e}"));
                return;
            }
        };

        let Some(hooks) = document.get("hooks") else {
            ctx.error("missing top-level \"hooks\" object".into());
            return;
        };
        let Some(events) = hooks.as_object() else {
            ctx.error("top-level \"hooks\" must be an object keyed by event name".into());
            return;
        };

        if document
            .get("description")
            .and_then(Value::as_str)
            .is_none_or(|d| d.trim().is_empty())
        {
            ctx.warning("missing top-level \"description\"".into());
        }

        for (event, value) in events {
            self.validate_event(&ctx, event, value).await;
        }

        if !rules::mentions_plugin_root(content) {
            ctx.warning(format!(
                "no hook command uses {PLUGIN_ROOT_VAR}; hardcoded paths break when the plugin is installed elsewhere"
            ));
        }
    }

    async fn validate_event(&self, ctx: &Context<'_>, event: &str, value: &Value) {
        let Some(bindings) = value.as_array() else {
            ctx.error(format!("{event}: must be an array of hook bindings"));
            return;
        };

        match EventBindings::decode(event, bindings) {
            EventBindings::Unknown => {
                tracing::debug!(subject = ctx.subject, event, "Skipping unknown hook event");
            }
            EventBindings::Lifecycle(decoded) => {
                let total = decoded.len();
                for (index, binding) in decoded.into_iter().enumerate() {
                    let label = binding_label(event, index, total);
                    match binding {
                        Ok(binding) => {
                            ctx.success(format!("{label}: lifecycle hook structure is correct"));
                            self.check_commands(ctx, &label, &binding.hooks).await;
                        }
                        Err(e) => ctx.error(format!("{label}: {e}")),
                    }
                }
            }
            EventBindings::Tool(decoded) => {
                let total = decoded.len();
                for (index, (binding, raw)) in decoded.into_iter().zip(bindings).enumerate() {
                    let label = binding_label(event, index, total);
                    match binding {
                        Ok(binding) => self.check_commands(ctx, &label, &binding.hooks).await,
                        Err(e) => ctx.error(format!("{label}: {e}")),
                    }
                    if raw.is_object() && !ToolBinding::has_matcher(raw) {
                        self.report_missing_matcher(ctx, &label);
                    }
                }
            }
        }
    }

    fn report_missing_matcher(&self, ctx: &Context<'_>, label: &str) {
        let message =
            format!("{label}: missing \"matcher\"; the hook will fire for every tool invocation");
        if self.strict_matcher {
            ctx.error(message);
        } else {
            ctx.warning(message);
        }
    }

    async fn check_commands(&self, ctx: &Context<'_>, label: &str, hooks: &[HookCommand]) {
        if hooks.is_empty() {
            ctx.warning(format!("{label}: \"hooks\" array is empty"));
            return;
        }

        for command in hooks.iter().filter_map(HookCommand::command) {
            if !rules::command_prefix(command).is_portable() {
                ctx.warning(format!(
                    "{label}: command '{command}' should declare an explicit interpreter ({}) or start with {PLUGIN_ROOT_VAR}",
                    KNOWN_INTERPRETERS.join(", ")
                ));
            }

            for relative in rules::plugin_root_paths(command) {
                if rules::escapes_root(&relative) {
                    ctx.warning(format!(
                        "{label}: referenced script {PLUGIN_ROOT_VAR}/{relative} points outside the plugin directory"
                    ));
                    continue;
                }
                let Some(root) = ctx.plugin_root else {
                    continue;
                };
                let exists = tokio::fs::try_exists(root.join(&relative))
                    .await
                    .unwrap_or(false);
                if !exists {
                    ctx.error(format!(
                        "{label}: referenced script {PLUGIN_ROOT_VAR}/{relative} does not exist"
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use crate::RunReport;
    use tempfile::tempdir;

    async fn validate_with(validator: HookValidator, content: &str) -> RunReport {
        let reporter = Reporter::new();
        validator
            .validate_document(content, "hooks.json", None, &reporter)
            .await;
        reporter.finalize()
    }

    async fn validate(content: &str) -> RunReport {
        validate_with(HookValidator::new(), content).await
    }

    fn mentioning<'a>(report: &'a RunReport, needle: &'a str) -> Vec<&'a Diagnostic> {
        report
            .diagnostics()
            .iter()
            .filter(|d| d.message.contains(needle))
            .collect()
    }

    #[tokio::test]
    async fn test_lifecycle_missing_wrapper() {
        let report = validate(
            r#"{"description":"d","hooks":{"SessionStart":[{"type":"command","command":"x"}]}}"#,
        )
        .await;
        let errors: Vec<_> = report.with_severity(Severity::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("SessionStart:"));
        assert!(errors[0].message.contains("missing hooks wrapper array"));
    }

    #[tokio::test]
    async fn test_lifecycle_wrapped_is_success() {
        let report = validate(
            r#"{"description":"d","hooks":{"SessionStart":[{"hooks":[{"type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/start.sh"}]}]}}"#,
        )
        .await;
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.counts().successes, 1);
    }

    #[tokio::test]
    async fn test_tool_event_correct_shape_no_diagnostics() {
        let report = validate(
            r#"{"description":"d","hooks":{"PreToolUse":[{"hooks":[{"type":"command","command":"bash ${ROOT}/s.sh"}],"matcher":"Edit"}]}}"#,
        )
        .await;
        assert!(mentioning(&report, "PreToolUse").is_empty());
    }

    #[tokio::test]
    async fn test_tool_event_missing_matcher_is_warning() {
        let report = validate(
            r#"{"description":"d","hooks":{"PostToolUse":[{"hooks":[{"type":"command","command":"${CLAUDE_PLUGIN_ROOT}/fmt.sh"}]}]}}"#,
        )
        .await;
        let found = mentioning(&report, "matcher");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Warning);
        assert_eq!(report.error_count(), 0);
    }

    #[tokio::test]
    async fn test_strict_matcher_promotes_to_error() {
        let report = validate_with(
            HookValidator::new().strict_matcher(true),
            r#"{"description":"d","hooks":{"PostToolUse":[{"hooks":[{"type":"command","command":"${CLAUDE_PLUGIN_ROOT}/fmt.sh"}]}]}}"#,
        )
        .await;
        assert_eq!(report.error_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_event_missing_hooks() {
        let report = validate(
            r#"{"description":"d","hooks":{"PreToolUse":[{"matcher":"Bash","type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/x.sh"}]}}"#,
        )
        .await;
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 0);
    }

    #[tokio::test]
    async fn test_unqualified_command_warns() {
        let report = validate(
            r#"{"description":"d","hooks":{"Stop":[{"hooks":[{"type":"command","command":"./notify.sh ${CLAUDE_PLUGIN_ROOT}"}]}]}}"#,
        )
        .await;
        let found = mentioning(&report, "explicit interpreter");
        assert_eq!(found.len(), 1);
        assert!(found[0].message.starts_with("Stop:"));
    }

    #[tokio::test]
    async fn test_prompt_hooks_are_not_interpreter_checked() {
        let report = validate(
            r#"{"description":"d","hooks":{"Stop":[{"hooks":[{"type":"prompt","prompt":"Summarize ${CLAUDE_PLUGIN_ROOT}"}]}]}}"#,
        )
        .await;
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.error_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_placeholder_warns_once() {
        let report = validate(
            r#"{"description":"d","hooks":{"Stop":[{"hooks":[{"type":"command","command":"bash /abs/a.sh"},{"type":"command","command":"bash /abs/b.sh"}]}]}}"#,
        )
        .await;
        assert_eq!(mentioning(&report, PLUGIN_ROOT_VAR).len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_event_not_flagged() {
        let report = validate(
            r#"{"description":"d","hooks":{"FutureEvent":[{"type":"command","command":"x"}],"Stop":[{"hooks":[{"type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/s.sh"}]}]}}"#,
        )
        .await;
        assert!(mentioning(&report, "FutureEvent").is_empty());
        assert_eq!(report.error_count(), 0);
    }

    #[tokio::test]
    async fn test_document_level_errors() {
        assert_eq!(validate("{not json").await.error_count(), 1);
        assert_eq!(validate("{not json").await.diagnostics().len(), 1);
        assert_eq!(validate(r#"{"description":"d"}"#).await.error_count(), 1);
        assert_eq!(validate(r#"{"hooks":[]}"#).await.error_count(), 1);

        let report = validate(r#"{"hooks":{"Stop":{"hooks":[]}}}"#).await;
        assert_eq!(report.error_count(), 1);
        assert!(!mentioning(&report, "description").is_empty());
    }

    #[tokio::test]
    async fn test_multiple_bindings_are_labelled() {
        let report = validate(
            r#"{"description":"d","hooks":{"SessionStart":[
                {"hooks":[{"type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/a.sh"}]},
                {"type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/b.sh"}
            ]}}"#,
        )
        .await;
        let errors: Vec<_> = report.with_severity(Severity::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("SessionStart[1]:"));
    }

    #[tokio::test]
    async fn test_referenced_script_must_exist() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("hooks")).unwrap();
        std::fs::write(dir.path().join("hooks/present.sh"), "#!/bin/bash\n").unwrap();

        let reporter = Reporter::new();
        HookValidator::new().validate_document(
            r#"{"description":"d","hooks":{"PreToolUse":[{"matcher":"Edit","hooks":[
                {"type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/hooks/present.sh"},
                {"type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/hooks/absent.sh"}
            ]}]}}"#,
            "hooks.json",
            Some(dir.path()),
            &reporter,
        )
        .await;
        let report = reporter.finalize();
        let errors: Vec<_> = report.with_severity(Severity::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("hooks/absent.sh"));
    }

    #[tokio::test]
    async fn test_script_outside_plugin_dir_warns() {
        let dir = tempdir().unwrap();
        let plugin = dir.path().join("plugin");
        std::fs::create_dir_all(&plugin).unwrap();
        std::fs::write(dir.path().join("x.sh"), "#!/bin/bash\n").unwrap();

        let reporter = Reporter::new();
        HookValidator::new()
            .validate_document(
                r#"{"description":"d","hooks":{"Stop":[{"hooks":[
                    {"type":"command","command":"bash ${CLAUDE_PLUGIN_ROOT}/../x.sh"}
                ]}]}}"#,
                "hooks.json",
                Some(&plugin),
                &reporter,
            )
            .await;
        let report = reporter.finalize();

        assert_eq!(report.error_count(), 0);
        let found = mentioning(&report, "outside the plugin directory");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Warning);
        assert!(found[0].message.starts_with("Stop: referenced script"));
    }
}
