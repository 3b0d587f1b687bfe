use std::fmt::{self, Write as _};

use colored::Colorize;
use serde::Serialize;

use super::{Diagnostic, RunReport, Severity};

/// One-line outcome of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    PassedWithWarnings,
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "PASSED"),
            Verdict::PassedWithWarnings => write!(f, "PASSED WITH WARNINGS"),
            Verdict::Failed => write!(f, "FAILED"),
        }
    }
}

fn marker(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "✗".red().bold(),
        Severity::Warning => "⚠".yellow(),
        Severity::Success => "✓".green(),
        Severity::Info => "ℹ".blue(),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    verdict: Verdict,
    exit_code: i32,
    counts: super::SeverityCounts,
    diagnostics: &'a [Diagnostic],
}

impl RunReport {
    pub fn verdict(&self) -> Verdict {
        if self.counts.errors > 0 {
            Verdict::Failed
        } else if self.counts.warnings > 0 {
            Verdict::PassedWithWarnings
        } else {
            Verdict::Passed
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.counts.errors, self.counts.warnings
        )
    }

    /// Human-readable report grouped by subject, in recording order.
    /// Success and info records are included only when `verbose` is set.
    pub fn render_text(&self, verbose: bool) -> String {
        let mut groups: Vec<(&str, Vec<&Diagnostic>)> = Vec::new();
        for diagnostic in &self.diagnostics {
            if diagnostic.severity.is_verbose_only() && !verbose {
                continue;
            }
            match groups.iter_mut().find(|(s, _)| *s == diagnostic.subject) {
                Some((_, items)) => items.push(diagnostic),
                None => groups.push((diagnostic.subject.as_str(), vec![diagnostic])),
            }
        }

        let mut out = String::new();
        for (subject, items) in &groups {
            let _ = writeln!(out, "{}", subject.bold());
            for d in items {
                let _ = writeln!(out, "  {} [{}] {}", marker(d.severity), d.category, d.message);
            }
            out.push('\n');
        }

        let verdict = match self.verdict() {
            Verdict::Passed => self.verdict().to_string().green().bold(),
            Verdict::PassedWithWarnings => self.verdict().to_string().yellow().bold(),
            Verdict::Failed => self.verdict().to_string().red().bold(),
        };
        let _ = writeln!(out, "Summary: {}", self.summary_line());
        let _ = writeln!(out, "Verdict: {verdict}");
        out
    }

    pub fn to_json(&self) -> crate::Result<String> {
        let report = JsonReport {
            verdict: self.verdict(),
            exit_code: self.exit_code(),
            counts: self.counts,
            diagnostics: &self.diagnostics,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Reporter, RuleCategory};

    fn sample() -> RunReport {
        let reporter = Reporter::new();
        reporter.record(Diagnostic::warning(RuleCategory::Manifest, "alpha", "missing license"));
        reporter.record(Diagnostic::success(RuleCategory::Hooks, "alpha", "SessionStart shape ok"));
        reporter.record(Diagnostic::error(RuleCategory::Hooks, "beta", "missing hooks wrapper array"));
        reporter.record(Diagnostic::warning(RuleCategory::Manifest, "alpha", "missing keywords"));
        reporter.finalize()
    }

    #[test]
    fn test_verdicts() {
        assert_eq!(Reporter::new().finalize().verdict(), Verdict::Passed);
        assert_eq!(sample().verdict(), Verdict::Failed);

        let reporter = Reporter::new();
        reporter.record(Diagnostic::warning(RuleCategory::Skills, "s", "short"));
        assert_eq!(reporter.finalize().verdict(), Verdict::PassedWithWarnings);
    }

    #[test]
    fn test_render_groups_by_subject() {
        let text = sample().render_text(false);
        let alpha = text.find("alpha").unwrap();
        let beta = text.find("beta").unwrap();
        assert!(alpha < beta);
        assert!(text.contains("missing license"));
        assert!(text.contains("missing keywords"));
        assert!(!text.contains("SessionStart shape ok"));
        assert!(text.contains("1 error(s), 2 warning(s)"));
        assert!(text.contains("FAILED"));
    }

    #[test]
    fn test_render_verbose_includes_success() {
        let text = sample().render_text(true);
        assert!(text.contains("SessionStart shape ok"));
    }

    #[test]
    fn test_json_output() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["verdict"], "failed");
        assert_eq!(json["exit_code"], 1);
        assert_eq!(json["counts"]["errors"], 1);
        assert_eq!(json["diagnostics"].as_array().unwrap().len(), 4);
    }
}
