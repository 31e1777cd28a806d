//! Category hierarchy: a trie keyed by path segments.
//!
//! The root node stands for the category directory itself. An entry whose
//! relative path is just the category (a category-level README or project)
//! attaches to the root.

use std::collections::BTreeMap;

use demoindex_shared::ProjectEntry;

/// One path segment within a category's hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Child segments, iterated in sorted order.
    pub children: BTreeMap<String, TreeNode>,
    /// The entry terminating at this node, if any.
    pub entry: Option<ProjectEntry>,
}

impl TreeNode {
    /// Whether an entry terminates at this node.
    pub fn is_project(&self) -> bool {
        self.entry.is_some()
    }

    /// Insert an entry along its path segments below the category.
    pub fn insert(&mut self, entry: ProjectEntry) {
        let segments = entry.segments();
        let mut node = self;
        for segment in segments.into_iter().skip(1) {
            node = node.children.entry(segment).or_default();
        }
        node.entry = Some(entry);
    }

    /// Total number of entries in this subtree.
    pub fn entry_count(&self) -> usize {
        usize::from(self.is_project())
            + self.children.values().map(TreeNode::entry_count).sum::<usize>()
    }
}

/// Fold one category's entries into a tree.
pub fn build_tree(entries: &[ProjectEntry]) -> TreeNode {
    let mut root = TreeNode::default();
    for entry in entries {
        root.insert(entry.clone());
    }
    root
}
