use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Entries of `dir` accepted by `filter`, sorted by path. A missing directory
/// yields an empty list. Symlinks are followed; a dangling one is passed to
/// `filter` with its own metadata.
pub async fn list_entries(
    dir: &Path,
    filter: impl Fn(&Path, &Metadata) -> bool,
) -> std::io::Result<Vec<PathBuf>> {
    let mut items = Vec::new();

    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(items);
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(_) => entry.metadata().await?,
        };
        if filter(&path, &metadata) {
            items.push(path);
        }
    }

    items.sort();
    Ok(items)
}

pub fn is_markdown(path: &Path, metadata: &Metadata) -> bool {
    metadata.is_file() && path.extension().is_some_and(|e| e == "md")
}

pub fn is_skill_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case("SKILL.md") || name.ends_with(".skill.md"))
}

/// Path relative to `base` for display, falling back to the full path.
pub fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
