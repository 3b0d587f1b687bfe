//! Diagnostic collection and run reports.
//!
//! A [`Reporter`] is the running state: validators append to it through a
//! shared reference, from any task. [`Reporter::finalize`] consumes it and
//! yields the frozen [`RunReport`].

mod diagnostic;
mod render;
mod reporter;

pub use diagnostic::{Diagnostic, RuleCategory, Severity};
pub use render::Verdict;
pub use reporter::{Reporter, RunReport, SeverityCounts};
