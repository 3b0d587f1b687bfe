//! Hook configuration validation.

mod schema;
mod validator;

pub use schema::{
    BindingError, EventBindings, EventClass, HookCommand, HookEvent, LifecycleBinding,
    ToolBinding, classify,
};
pub use validator::HookValidator;
