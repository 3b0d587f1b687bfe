//! Validation driver.
//!
//! Discovers plugins under the configured root, validates each one in its
//! own future (at most `jobs` at a time) and merges the per-plugin findings in
//! discovery order, so repeated runs over the same tree produce identical
//! reports.

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::ValidatorConfig;
use crate::documents::DocumentValidator;
use crate::hooks::HookValidator;
use crate::marketplace::MarketplaceValidator;
use crate::permissions::ScriptPermissionChecker;
use crate::plugins::{PluginDescriptor, PluginDiscovery};
use crate::report::{Diagnostic, Reporter, RuleCategory, RunReport};
use crate::skills::SkillValidator;

/// Findings for one plugin, plus the name it registers under.
#[derive(Debug)]
struct PluginOutcome {
    name: String,
    diagnostics: Vec<Diagnostic>,
}

/// Runs every enabled validator over the tree rooted at `config.root`.
///
/// Document-level problems become diagnostics; only an unusable root, an
/// unreadable plugin tree or an unreadable marketplace index is returned as
/// an error.
pub async fn run(config: &ValidatorConfig) -> crate::Result<RunReport> {
    let plugins = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            config.validate()?;
            PluginDiscovery::discover(config.root())
        })
        .await??
    };
    let root = config.root();
    info!(root = %root.display(), plugins = plugins.len(), jobs = config.jobs, "Starting validation");

    let reporter = Reporter::new();
    if plugins.is_empty() && config.is_enabled(RuleCategory::Discovery) {
        reporter.record(Diagnostic::warning(
            RuleCategory::Discovery,
            root.display().to_string(),
            "no plugins found (expected plugins/<name>/ or a .claude-plugin/plugin.json)",
        ));
    }

    let semaphore = Semaphore::new(config.jobs);
    let hooks = HookValidator::new().strict_matcher(config.strict_matcher);

    let tasks = plugins.iter().map(|plugin| {
        let semaphore = &semaphore;
        let hooks = &hooks;
        async move {
            let _permit = semaphore.acquire().await.ok();
            validate_plugin(plugin, config, hooks).await
        }
    });
    let outcomes: Vec<PluginOutcome> = join_all(tasks).await;

    if config.is_enabled(RuleCategory::Marketplace) {
        let names = outcomes.iter().map(|o| o.name.clone());
        MarketplaceValidator::new(root)
            .with_known_plugins(names)
            .validate(&reporter)
            .await?;
    }

    for outcome in outcomes {
        reporter.extend(outcome.diagnostics);
    }

    let report = reporter.finalize();
    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Validation finished"
    );
    Ok(report)
}

async fn validate_plugin(
    plugin: &PluginDescriptor,
    config: &ValidatorConfig,
    hooks: &HookValidator,
) -> PluginOutcome {
    let reporter = Reporter::new();
    debug!(plugin = %plugin.dir_name(), "Validating plugin");

    // The manifest name is needed for marketplace cross-checks even when
    // manifest diagnostics are switched off.
    let manifest_name = if config.is_enabled(RuleCategory::Manifest) {
        plugin.validate_manifest(&reporter).await
    } else {
        plugin.validate_manifest(&Reporter::new()).await
    };
    let name = manifest_name.unwrap_or_else(|| plugin.dir_name());

    if config.is_enabled(RuleCategory::Hooks) {
        hooks.validate_plugin(plugin, &reporter).await;
    }
    if config.is_enabled(RuleCategory::Skills) {
        SkillValidator::new().validate_plugin(plugin, &reporter).await;
    }
    if config.is_enabled(RuleCategory::Documents) {
        DocumentValidator::new().validate_plugin(plugin, &reporter).await;
    }
    if config.is_enabled(RuleCategory::Permissions) {
        ScriptPermissionChecker::new()
            .check_plugin(plugin, &reporter)
            .await;
    }

    let report = reporter.finalize();
    debug!(
        plugin = %name,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Plugin validated"
    );
    PluginOutcome {
        name,
        diagnostics: report.into_diagnostics(),
    }
}
