//! Hook script permission checks.
//!
//! Every script under a plugin's `hooks/` directory must be executable and
//! start with a `#!` interpreter line, otherwise the hook runner cannot
//! launch it directly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::plugins::PluginDescriptor;
use crate::report::{Diagnostic, Reporter, RuleCategory};
use crate::rules;

const CATEGORY: RuleCategory = RuleCategory::Permissions;

/// File extensions treated as hook scripts.
pub const SCRIPT_EXTENSIONS: &[&str] = &[
    "sh", "bash", "zsh", "py", "js", "mjs", "cjs", "ts", "rb", "pl",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptPermissionChecker;

impl ScriptPermissionChecker {
    pub fn new() -> Self {
        Self
    }

    /// Script files anywhere below `hooks_dir`, sorted and deduplicated.
    pub async fn find_scripts(hooks_dir: &Path) -> crate::Result<Vec<PathBuf>> {
        let base = glob::Pattern::escape(&hooks_dir.to_string_lossy());

        let found = tokio::task::spawn_blocking(move || {
            let mut found = BTreeSet::new();
            for ext in SCRIPT_EXTENSIONS {
                let pattern = format!("{base}/**/*.{ext}");
                match glob::glob(&pattern) {
                    Ok(paths) => found.extend(paths.filter_map(|r| r.ok()).filter(|p| p.is_file())),
                    Err(e) => tracing::warn!(pattern = %pattern, error = %e, "invalid script pattern"),
                }
            }
            found
        })
        .await?;

        Ok(found.into_iter().collect())
    }

    pub async fn check_plugin(&self, plugin: &PluginDescriptor, reporter: &Reporter) {
        let hooks_dir = plugin.hooks_dir();
        let has_hooks = tokio::fs::metadata(&hooks_dir)
            .await
            .is_ok_and(|m| m.is_dir());
        if !has_hooks {
            return;
        }

        let scripts = match Self::find_scripts(&hooks_dir).await {
            Ok(scripts) => scripts,
            Err(e) => {
                reporter.record(Diagnostic::error(
                    CATEGORY,
                    plugin.subject(&hooks_dir),
                    format!("failed to scan hook scripts: {e}"),
                ));
                return;
            }
        };

        tracing::debug!(plugin = %plugin.dir_name(), count = scripts.len(), "checking hook scripts");
        for script in scripts {
            self.check_script(&script, &plugin.subject(&script), reporter)
                .await;
        }
    }

    pub async fn check_script(&self, path: &Path, subject: &str, reporter: &Reporter) {
        let before = reporter.len();

        match tokio::fs::metadata(path).await {
            Ok(metadata) => {
                if !is_executable(&metadata) {
                    reporter.record(Diagnostic::warning(
                        CATEGORY,
                        subject,
                        format!("script is not executable; run: chmod +x {}", path.display()),
                    ));
                }
            }
            Err(e) => {
                reporter.record(Diagnostic::error(
                    CATEGORY,
                    subject,
                    format!("failed to stat script: {e}"),
                ));
                return;
            }
        }

        let interpreter = match tokio::fs::read(path).await {
            Ok(bytes) => {
                let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
                let first_line = String::from_utf8_lossy(first_line);
                rules::shebang_interpreter(first_line.trim_end()).map(str::to_string)
            }
            Err(e) => {
                reporter.record(Diagnostic::error(
                    CATEGORY,
                    subject,
                    format!("failed to read script: {e}"),
                ));
                return;
            }
        };

        match interpreter {
            None => reporter.record(Diagnostic::warning(
                CATEGORY,
                subject,
                "first line is not a #! interpreter directive",
            )),
            Some(interpreter) if reporter.len() == before => reporter.record(Diagnostic::success(
                CATEGORY,
                subject,
                format!("executable, runs with {interpreter}"),
            )),
            Some(_) => {}
        }
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use tempfile::tempdir;

    #[cfg(unix)]
    fn set_mode(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[tokio::test]
    async fn test_find_scripts_recursive() {
        let dir = tempdir().unwrap();
        let hooks = dir.path().join("hooks");
        std::fs::create_dir_all(hooks.join("lib")).unwrap();
        std::fs::write(hooks.join("check.sh"), "#!/bin/bash\n").unwrap();
        std::fs::write(hooks.join("lib").join("guard.py"), "#!/usr/bin/env python3\n").unwrap();
        std::fs::write(hooks.join("hooks.json"), "{}").unwrap();
        std::fs::write(hooks.join("README.md"), "docs").unwrap();

        let scripts = ScriptPermissionChecker::find_scripts(&hooks).await.unwrap();
        assert_eq!(
            scripts,
            vec![hooks.join("check.sh"), hooks.join("lib").join("guard.py")]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_executable_script() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("check.sh");
        std::fs::write(&script, "#!/bin/bash\necho ok\n").unwrap();
        set_mode(&script, 0o644);

        let reporter = Reporter::new();
        ScriptPermissionChecker::new()
            .check_script(&script, "hooks/check.sh", &reporter)
            .await;
        let report = reporter.finalize();

        let warnings: Vec<_> = report.with_severity(Severity::Warning).collect();
        assert_eq!(warnings.len(), 1);
        assert!(
            warnings[0]
                .message
                .ends_with(&format!("chmod +x {}", script.display()))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_executable_script_with_shebang() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("check.sh");
        std::fs::write(&script, "#!/usr/bin/env bash\necho ok\n").unwrap();
        set_mode(&script, 0o755);

        let reporter = Reporter::new();
        ScriptPermissionChecker::new()
            .check_script(&script, "hooks/check.sh", &reporter)
            .await;
        let report = reporter.finalize();

        assert!(report.is_clean());
        assert_eq!(report.counts().successes, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_shebang() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("check.py");
        std::fs::write(&script, "print('hi')\n").unwrap();
        set_mode(&script, 0o755);

        let reporter = Reporter::new();
        ScriptPermissionChecker::new()
            .check_script(&script, "hooks/check.py", &reporter)
            .await;
        let report = reporter.finalize();

        assert_eq!(report.warning_count(), 1);
        assert!(report.diagnostics()[0].message.contains("#!"));
    }

    #[tokio::test]
    async fn test_plugin_without_hooks_dir_is_skipped() {
        let dir = tempdir().unwrap();
        let plugin_dir = dir.path().join("plain");
        std::fs::create_dir_all(&plugin_dir).unwrap();
        // A file named like the directory is not a hooks directory.
        std::fs::write(plugin_dir.join("hooks"), "").unwrap();
        let plugin = PluginDescriptor::new(plugin_dir, dir.path().to_path_buf());

        let reporter = Reporter::new();
        ScriptPermissionChecker::new()
            .check_plugin(&plugin, &reporter)
            .await;
        assert!(reporter.is_empty());
    }
}
