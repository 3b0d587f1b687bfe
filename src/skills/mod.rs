//! Skill frontmatter validation.
//!
//! Skills live at `skills/<name>/SKILL.md` (or `skills/<name>.skill.md`) and
//! open with a `---` delimited block declaring `name`, `description` and
//! optionally `allowed-tools`.

mod validator;

pub use validator::SkillValidator;
