use std::path::{Path, PathBuf};

use super::manifest::{PLUGIN_CONFIG_DIR, PLUGIN_MANIFEST_FILE, PluginDescriptor};

/// Directory that holds one sub-directory per plugin in a marketplace repo.
pub const PLUGINS_DIR: &str = "plugins";

pub struct PluginDiscovery;

impl PluginDiscovery {
    /// Enumerates plugin directories under `root`, sorted by path.
    ///
    /// Every directory under `root/plugins/` is a plugin, whether or not it
    /// has a manifest. Without a `plugins/` directory, `root` itself is the
    /// plugin when it carries `.claude-plugin/plugin.json`, otherwise its
    /// children that do are.
    pub fn discover(root: &Path) -> Result<Vec<PluginDescriptor>, crate::Error> {
        if !root.is_dir() {
            return Err(crate::Error::RootNotFound(root.to_path_buf()));
        }

        let plugins_dir = root.join(PLUGINS_DIR);
        let mut dirs: Vec<PathBuf> = if plugins_dir.is_dir() {
            Self::child_dirs(&plugins_dir)?
                .into_iter()
                .filter(|p| !Self::is_hidden(p))
                .collect()
        } else if Self::is_plugin_root(root) {
            vec![root.to_path_buf()]
        } else {
            Self::child_dirs(root)?
                .into_iter()
                .filter(|p| Self::is_plugin_root(p))
                .collect()
        };
        dirs.sort();

        tracing::debug!(root = %root.display(), count = dirs.len(), "Discovered plugins");
        Ok(dirs
            .into_iter()
            .map(|dir| PluginDescriptor::new(dir, root.to_path_buf()))
            .collect())
    }

    fn is_plugin_root(dir: &Path) -> bool {
        dir.join(PLUGIN_CONFIG_DIR).join(PLUGIN_MANIFEST_FILE).is_file()
    }

    fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
    }

    fn child_dirs(parent: &Path) -> Result<Vec<PathBuf>, crate::Error> {
        let enumerate = |source| crate::Error::Enumerate {
            path: parent.to_path_buf(),
            source,
        };

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(parent).map_err(enumerate)? {
            let path = entry.map_err(enumerate)?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_plugin(parent: &Path, name: &str) -> PathBuf {
        let plugin_dir = parent.join(name);
        let config_dir = plugin_dir.join(PLUGIN_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join(PLUGIN_MANIFEST_FILE),
            format!(r#"{{"name":"{}","description":"Test","version":"1.0.0"}}"#, name),
        )
        .unwrap();
        plugin_dir
    }

    #[test]
    fn test_discover_marketplace_layout() {
        let dir = tempdir().unwrap();
        let plugins = dir.path().join(PLUGINS_DIR);
        create_plugin(&plugins, "plugin-b");
        create_plugin(&plugins, "plugin-a");
        std::fs::create_dir_all(plugins.join("no-manifest")).unwrap();
        std::fs::create_dir_all(plugins.join(".cache")).unwrap();

        let descriptors = PluginDiscovery::discover(dir.path()).unwrap();
        let names: Vec<String> = descriptors.iter().map(|d| d.dir_name()).collect();
        assert_eq!(names, vec!["no-manifest", "plugin-a", "plugin-b"]);
    }

    #[test]
    fn test_discover_direct_plugin_root() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_plugin(dir.path(), "my-plugin");

        let descriptors = PluginDiscovery::discover(&plugin_dir).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].root_dir(), plugin_dir.as_path());
    }

    #[test]
    fn test_discover_children_with_manifest_only() {
        let dir = tempdir().unwrap();
        create_plugin(dir.path(), "real-plugin");
        std::fs::create_dir(dir.path().join("not-a-plugin")).unwrap();

        let descriptors = PluginDiscovery::discover(dir.path()).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].dir_name(), "real-plugin");
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempdir().unwrap();
        assert!(PluginDiscovery::discover(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_nonexistent_root() {
        let err = PluginDiscovery::discover(Path::new("/nonexistent/path")).unwrap_err();
        assert!(matches!(err, crate::Error::RootNotFound(_)));
    }
}
