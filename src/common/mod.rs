mod directory;
mod field;
mod frontmatter;

pub use directory::{display_path, is_markdown, is_skill_file, list_entries};
pub use field::{Field, json_kind};
pub use frontmatter::{FrontmatterBlock, FrontmatterError, FrontmatterFields, split_frontmatter};
