use serde::Deserialize;

const MARKER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontmatterError {
    #[error("missing frontmatter (first line must be '---')")]
    Missing,

    #[error("frontmatter not terminated (no closing '---' line)")]
    Unterminated,
}

/// The delimited block at the top of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    pub raw: &'a str,
}

fn is_marker(line: &str) -> bool {
    line.trim_end() == MARKER
}

/// Locates the first `---` delimited block. The opening marker must be the
/// first line and the closing marker a standalone line.
pub fn split_frontmatter(content: &str) -> Result<FrontmatterBlock<'_>, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    match lines.next() {
        Some(first) if is_marker(first) => {}
        _ => return Err(FrontmatterError::Missing),
    }

    let block_start = content
        .find('\n')
        .map(|i| i + 1)
        .ok_or(FrontmatterError::Unterminated)?;
    let mut offset = block_start;
    for line in lines {
        if is_marker(line) {
            return Ok(FrontmatterBlock {
                raw: &content[block_start..offset],
            });
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToolList {
    List(Vec<String>),
    Inline(String),
}

impl ToolList {
    fn into_vec(self) -> Vec<String> {
        match self {
            ToolList::List(items) => items,
            ToolList::Inline(s) => split_inline_list(&s),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawFrontmatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "allowed-tools", alias = "allowed_tools")]
    allowed_tools: Option<ToolList>,
}

/// Keys the validators look at, extracted from a frontmatter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub allowed_tools: Option<Vec<String>>,
    /// Set when the block is not valid YAML and a line scan was used.
    pub yaml_error: Option<String>,
}

impl FrontmatterFields {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_yaml_bw::from_str::<RawFrontmatter>(raw) {
            Ok(fm) => Self {
                name: fm.name.map(|s| s.trim().to_string()),
                description: fm.description.map(|s| s.trim().to_string()),
                allowed_tools: fm.allowed_tools.map(ToolList::into_vec),
                yaml_error: None,
            },
            Err(e) => {
                let mut fields = Self::scan_lines(raw);
                fields.yaml_error = Some(e.to_string());
                fields
            }
        }
    }

    /// `key: value` scan over top-level lines.
    fn scan_lines(raw: &str) -> Self {
        let mut fields = Self::default();
        for line in raw.lines() {
            if line.starts_with(char::is_whitespace) {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = unquote(value.trim());
            match key.trim() {
                "name" if fields.name.is_none() => fields.name = Some(value.to_string()),
                "description" if fields.description.is_none() => {
                    fields.description = Some(value.to_string())
                }
                "allowed-tools" | "allowed_tools" if fields.allowed_tools.is_none() => {
                    fields.allowed_tools = Some(split_inline_list(value))
                }
                _ => {}
            }
        }
        fields
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn split_inline_list(value: &str) -> Vec<String> {
    let value = value.trim();
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    inner
        .split(',')
        .map(|s| unquote(s.trim()).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
