//! Typed shapes of `hooks/hooks.json`.
//!
//! Events fall into two classes with different binding shapes:
//!
//! - lifecycle: `{"hooks": [{"type": "command", ...}]}`
//! - tool-triggered: `{"matcher": "Write|Edit", "hooks": [{"type": "command", ...}]}`
//!
//! Bindings are decoded from raw JSON per class so a command placed directly
//! at binding level (the classic lifecycle mistake) surfaces as
//! [`BindingError::MissingWrapper`] instead of being silently accepted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hook event names understood by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    /// Before a tool is executed
    PreToolUse,

    /// After a tool is executed
    PostToolUse,

    /// When permission is requested for a tool
    PermissionRequest,

    /// For host notifications
    Notification,

    /// When the user submits a prompt
    UserPromptSubmit,

    /// When the agent stops
    Stop,

    /// When a subagent completes
    SubagentStop,

    /// Before conversation compaction
    PreCompact,

    /// When a session begins
    SessionStart,

    /// When a session ends
    SessionEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// Session or compaction phase; no matcher.
    Lifecycle,
    /// Fired around a tool call; requires a matcher.
    ToolTriggered,
    /// Not known to this validator; skipped.
    Unknown,
}

impl HookEvent {
    pub fn all() -> &'static [HookEvent] {
        &[
            HookEvent::PreToolUse,
            HookEvent::PostToolUse,
            HookEvent::PermissionRequest,
            HookEvent::Notification,
            HookEvent::UserPromptSubmit,
            HookEvent::Stop,
            HookEvent::SubagentStop,
            HookEvent::PreCompact,
            HookEvent::SessionStart,
            HookEvent::SessionEnd,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::PermissionRequest => "PermissionRequest",
            HookEvent::Notification => "Notification",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::Stop => "Stop",
            HookEvent::SubagentStop => "SubagentStop",
            HookEvent::PreCompact => "PreCompact",
            HookEvent::SessionStart => "SessionStart",
            HookEvent::SessionEnd => "SessionEnd",
        }
    }

    pub fn from_pascal_case(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|e| e.as_str() == name)
    }

    pub fn class(&self) -> EventClass {
        match self {
            HookEvent::PreToolUse
            | HookEvent::PostToolUse
            | HookEvent::PermissionRequest
            | HookEvent::Notification => EventClass::ToolTriggered,
            HookEvent::UserPromptSubmit
            | HookEvent::Stop
            | HookEvent::SubagentStop
            | HookEvent::PreCompact
            | HookEvent::SessionStart
            | HookEvent::SessionEnd => EventClass::Lifecycle,
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(event_name: &str) -> EventClass {
    HookEvent::from_pascal_case(event_name)
        .map(|e| e.class())
        .unwrap_or(EventClass::Unknown)
}

/// A single hook action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HookCommand {
    Command {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
    Prompt {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
}

impl HookCommand {
    pub fn command(&self) -> Option<&str> {
        match self {
            HookCommand::Command { command, .. } => Some(command),
            HookCommand::Prompt { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("binding must be a JSON object")]
    NotAnObject,

    #[error("missing hooks wrapper array (commands must be nested under \"hooks\")")]
    MissingWrapper,

    #[error("missing \"hooks\" array")]
    MissingHooks,

    #[error("\"matcher\" must be a string")]
    InvalidMatcher,

    #[error("invalid hook commands: {0}")]
    InvalidCommands(String),
}

fn decode_commands(
    object: &serde_json::Map<String, Value>,
) -> Result<Vec<HookCommand>, BindingError> {
    if object.contains_key("type") {
        return Err(BindingError::MissingWrapper);
    }
    let hooks = object.get("hooks").ok_or(BindingError::MissingHooks)?;
    Vec::<HookCommand>::deserialize(hooks).map_err(|e| BindingError::InvalidCommands(e.to_string()))
}

/// Binding of a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleBinding {
    pub hooks: Vec<HookCommand>,
}

impl LifecycleBinding {
    pub fn decode(value: &Value) -> Result<Self, BindingError> {
        let object = value.as_object().ok_or(BindingError::NotAnObject)?;
        match decode_commands(object) {
            Ok(hooks) => Ok(Self { hooks }),
            Err(BindingError::MissingHooks) => Err(BindingError::MissingWrapper),
            Err(e) => Err(e),
        }
    }
}

/// Binding of a tool-triggered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolBinding {
    pub matcher: Option<String>,
    pub hooks: Vec<HookCommand>,
}

impl ToolBinding {
    pub fn decode(value: &Value) -> Result<Self, BindingError> {
        let object = value.as_object().ok_or(BindingError::NotAnObject)?;
        let hooks = decode_commands(object)?;
        let matcher = match object.get("matcher") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(BindingError::InvalidMatcher),
        };
        Ok(Self { matcher, hooks })
    }

    /// Whether `value` carries a non-empty `matcher` string, regardless of
    /// whether the rest of the binding decodes.
    pub fn has_matcher(value: &Value) -> bool {
        value
            .get("matcher")
            .and_then(Value::as_str)
            .is_some_and(|m| !m.trim().is_empty())
    }
}

/// Decoded bindings of one event, tagged by the event's class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventBindings {
    Lifecycle(Vec<Result<LifecycleBinding, BindingError>>),
    Tool(Vec<Result<ToolBinding, BindingError>>),
    Unknown,
}

impl EventBindings {
    pub fn decode(event_name: &str, bindings: &[Value]) -> Self {
        match classify(event_name) {
            EventClass::Lifecycle => {
                EventBindings::Lifecycle(bindings.iter().map(LifecycleBinding::decode).collect())
            }
            EventClass::ToolTriggered => {
                EventBindings::Tool(bindings.iter().map(ToolBinding::decode).collect())
            }
            EventClass::Unknown => EventBindings::Unknown,
        }
    }
}
