//! # claude-plugin-validator
//!
//! Structural validation for plugin marketplaces: plugin manifests, hook
//! configurations, skill/agent/command frontmatter, hook script permissions and
//! the marketplace index.
//!
//! Every validator writes its findings into a shared [`Reporter`]; the driver
//! finalizes it into a [`RunReport`] whose exit code gates CI.
//!
//! ```rust,no_run
//! use claude_plugin_validator::{ValidatorConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), claude_plugin_validator::Error> {
//!     let config = ValidatorConfig::new(".").with_env()?;
//!     let report = run(&config).await?;
//!     print!("{}", report.render_text(false));
//!     std::process::exit(report.exit_code());
//! }
//! ```

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod documents;
pub mod hooks;
pub mod marketplace;
pub mod permissions;
pub mod plugins;
pub mod report;
pub mod rules;
pub mod runner;
pub mod skills;

use std::path::PathBuf;

pub use config::ValidatorConfig;
pub use plugins::{PluginDescriptor, PluginDiscovery};
pub use report::{Diagnostic, Reporter, RuleCategory, RunReport, Severity, SeverityCounts};
pub use runner::run;

/// Process-level failures. Anything document-scoped is reported as a
/// [`Diagnostic`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root directory to validate does not exist.
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// The plugin tree could not be enumerated.
    #[error("Failed to enumerate plugins under {path}: {source}")]
    Enumerate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The marketplace index exists but cannot be read.
    #[error("Marketplace index unreadable at {path}: {source}")]
    MarketplaceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A validation task panicked or was cancelled.
    #[error("Validation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Exit code used by the CLI for process-fatal failures.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

pub type Result<T> = std::result::Result<T, Error>;
