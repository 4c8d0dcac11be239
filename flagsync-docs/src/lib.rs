//! # flagsync-docs
//!
//! Markdown document model: frontmatter parse/patch, flag-block
//! parse/rebuild, and the filesystem document store.
//!
//! All text transforms are pure; only [`store`] touches the filesystem.

pub mod error;
pub mod flagblock;
pub mod frontmatter;
pub mod store;

pub use error::DocError;
pub use flagblock::{
    extract_flag_keys_from_content, parse_flag_block, rebuild_flag_block, FlagBlockRegion,
};
pub use frontmatter::{parse_frontmatter, update_frontmatter, FrontmatterOutcome};
pub use store::{DocumentStore, FsStore};
