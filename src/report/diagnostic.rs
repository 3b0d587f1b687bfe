use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural or required-field violation; fails the run.
    Error,
    /// Recommended field missing, or a portability/style risk.
    Warning,
    /// A checked rule passed.
    Success,
    Info,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Success and info records are only shown in verbose output.
    pub fn is_verbose_only(&self) -> bool {
        matches!(self, Severity::Success | Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Success => write!(f, "success"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Rule family a diagnostic belongs to. Categories can be switched off as a
/// whole through configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Discovery,
    Manifest,
    Hooks,
    Skills,
    Documents,
    Marketplace,
    Permissions,
}

impl RuleCategory {
    pub fn all() -> &'static [RuleCategory] {
        &[
            RuleCategory::Discovery,
            RuleCategory::Manifest,
            RuleCategory::Hooks,
            RuleCategory::Skills,
            RuleCategory::Documents,
            RuleCategory::Marketplace,
            RuleCategory::Permissions,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Discovery => "discovery",
            RuleCategory::Manifest => "manifest",
            RuleCategory::Hooks => "hooks",
            RuleCategory::Skills => "skills",
            RuleCategory::Documents => "documents",
            RuleCategory::Marketplace => "marketplace",
            RuleCategory::Permissions => "permissions",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        RuleCategory::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = RuleCategory::all().iter().map(|c| c.as_str()).collect();
                format!("unknown rule category '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// A single categorized finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: RuleCategory,
    /// Plugin name or file path the finding is about.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        category: RuleCategory,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn error(category: RuleCategory, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, subject, message)
    }

    pub fn warning(
        category: RuleCategory,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, category, subject, message)
    }

    pub fn success(
        category: RuleCategory,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Success, category, subject, message)
    }

    pub fn info(category: RuleCategory, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, subject, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.subject, self.category, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("hooks".parse::<RuleCategory>(), Ok(RuleCategory::Hooks));
        assert_eq!(" Manifest ".parse::<RuleCategory>(), Ok(RuleCategory::Manifest));
        let err = "bogus".parse::<RuleCategory>().unwrap_err();
        assert!(err.contains("bogus"));
        assert!(err.contains("permissions"));
    }

    #[test]
    fn test_severity_flags() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
        assert!(Severity::Success.is_verbose_only());
        assert!(Severity::Info.is_verbose_only());
        assert!(!Severity::Warning.is_verbose_only());
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error(RuleCategory::Hooks, "my-plugin", "missing hooks wrapper array");
        assert_eq!(
            d.to_string(),
            "[error] my-plugin (hooks): missing hooks wrapper array"
        );
    }

    #[test]
    fn test_diagnostic_serializes_lowercase() {
        let d = Diagnostic::warning(RuleCategory::Skills, "s", "m");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["category"], "skills");
    }
}
