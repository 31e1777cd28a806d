//! Outline generation for a demo project tree.
//!
//! This crate ties discovery, categorization, hierarchy building, rendering,
//! and link validation into the sidebar pipeline ([`sidebar::generate_sidebar`]).

pub mod categorize;
pub mod hierarchy;
pub mod link_check;
pub mod render;
pub mod sidebar;

pub use categorize::group_by_category;
pub use hierarchy::{TreeNode, build_tree};
pub use link_check::{
    BrokenLink, LinkRoot, entries_missing_readme, resolve_target, validate_links, validate_links_in,
};
pub use render::{
    CategoryHeader, ModeSelection, NO_README_MARKER, OutlineRenderer, RenderMode, category_header,
    docs_link,
};
pub use sidebar::{NO_PROJECTS, SidebarOptions, SidebarOutput, generate_sidebar, link_resolution};
