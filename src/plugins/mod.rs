//! Plugin discovery and manifest validation.
//!
//! A marketplace repository keeps one directory per plugin:
//!
//! ```text
//! repo/
//! ├── .claude-plugin/
//! │   └── marketplace.json
//! └── plugins/
//!     └── my-plugin/
//!         ├── .claude-plugin/
//!         │   └── plugin.json
//!         ├── skills/
//!         │   └── commit/
//!         │       └── SKILL.md
//!         ├── commands/
//!         │   └── hello.md
//!         ├── agents/
//!         │   └── reviewer.md
//!         └── hooks/
//!             ├── hooks.json
//!             └── check.sh
//! ```

mod discovery;
mod manifest;

pub use discovery::{PLUGINS_DIR, PluginDiscovery};
pub use manifest::{
    AuthorField, ManifestError, ManifestValidator, PluginAuthor, PluginDescriptor, PluginManifest,
    PluginRepository, RepositoryField,
};
pub(crate) use manifest::PLUGIN_CONFIG_DIR;
