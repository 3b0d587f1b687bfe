//! Rule primitives shared by the validators.
//!
//! Each check is a small pure function over a string so it can be tested in
//! isolation; the validators only decide severity and wording.

use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::Regex;

/// Substitution token for the plugin's install-time root directory.
pub const PLUGIN_ROOT_VAR: &str = "${CLAUDE_PLUGIN_ROOT}";

/// Interpreters accepted as the leading token of a hook command.
pub const KNOWN_INTERPRETERS: &[&str] = &["bash", "sh", "python3", "node", "ruby", "perl"];

pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_DESCRIPTION_LENGTH: usize = 1024;
pub const MIN_DESCRIPTION_LENGTH: usize = 50;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid identifier regex"));

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)(?P<rest>[-+.].*)?$")
        .expect("valid semver regex")
});

static COMMAND_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r#"^\s*(?:(?P<interpreter>{})(?:\s|$)|(?P<root>"?\$\{{CLAUDE_PLUGIN_ROOT\}}))"#,
        KNOWN_INTERPRETERS.join("|")
    );
    Regex::new(&pattern).expect("valid command prefix regex")
});

static ROOT_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$\{CLAUDE_PLUGIN_ROOT\}/(?P<path>[^\s"';|&><]+)"#)
        .expect("valid root script regex")
});

static SHEBANG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#!\s*(?P<interpreter>\S+)").expect("valid shebang regex"));

/// `[a-z0-9]+(-[a-z0-9]+)*`
pub fn is_identifier(value: &str) -> bool {
    IDENTIFIER.is_match(value)
}

/// `MAJOR.MINOR.PATCH` optionally followed by a pre-release or build suffix.
pub fn is_semver(value: &str) -> bool {
    SEMVER.is_match(value)
}

/// How a hook command string starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPrefix {
    Interpreter(String),
    PluginRoot,
    Unqualified,
}

impl CommandPrefix {
    pub fn is_portable(&self) -> bool {
        !matches!(self, CommandPrefix::Unqualified)
    }
}

pub fn command_prefix(command: &str) -> CommandPrefix {
    let Some(caps) = COMMAND_PREFIX.captures(command) else {
        return CommandPrefix::Unqualified;
    };
    if let Some(interpreter) = caps.name("interpreter") {
        CommandPrefix::Interpreter(interpreter.as_str().to_string())
    } else {
        CommandPrefix::PluginRoot
    }
}

pub fn mentions_plugin_root(text: &str) -> bool {
    text.contains(PLUGIN_ROOT_VAR)
}

/// Relative paths referenced as `${CLAUDE_PLUGIN_ROOT}/<path>` in a command.
pub fn plugin_root_paths(command: &str) -> Vec<String> {
    ROOT_SCRIPT
        .captures_iter(command)
        .filter_map(|caps| caps.name("path"))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// True when a placeholder-relative path leaves the plugin directory, through
/// `..` or by being absolute.
pub fn escapes_root(relative: &str) -> bool {
    Path::new(relative).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Interpreter named by a `#!` line, if the first line is one.
pub fn shebang_interpreter(first_line: &str) -> Option<&str> {
    SHEBANG
        .captures(first_line)
        .and_then(|caps| caps.name("interpreter"))
        .map(|m| m.as_str())
}

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
