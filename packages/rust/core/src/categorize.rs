//! Grouping of discovered entries by category.

use std::collections::BTreeMap;

use demoindex_shared::ProjectEntry;

/// Group entries by their category, each list sorted by relative path.
///
/// Paths compare segment by segment, so `2d/a/b` sorts before `2d/a-b`.
pub fn group_by_category(entries: Vec<ProjectEntry>) -> BTreeMap<String, Vec<ProjectEntry>> {
    let mut categories: BTreeMap<String, Vec<ProjectEntry>> = BTreeMap::new();

    for entry in entries {
        categories
            .entry(entry.category.clone())
            .or_default()
            .push(entry);
    }

    for list in categories.values_mut() {
        list.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn entry(rel: &str) -> ProjectEntry {
        let root = Path::new("/demos");
        ProjectEntry::new(root, &root.join(rel), None, None, true).unwrap()
    }

    #[test]
    fn groups_and_sorts() {
        let entries = vec![
            entry("3d/voxel"),
            entry("2d/platformer"),
            entry("3d/physics/ragdoll"),
            entry("2d/isometric"),
            entry("3d/physics"),
        ];

        let categories = group_by_category(entries);
        let names: Vec<&str> = categories.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["2d", "3d"]);

        let three_d: Vec<String> = categories["3d"].iter().map(|e| e.relative_slash_path()).collect();
        assert_eq!(three_d, vec!["3d/physics", "3d/physics/ragdoll", "3d/voxel"]);

        let two_d: Vec<String> = categories["2d"].iter().map(|e| e.relative_slash_path()).collect();
        assert_eq!(two_d, vec!["2d/isometric", "2d/platformer"]);
    }

    #[test]
    fn segment_order_not_string_order() {
        let categories = group_by_category(vec![entry("gui/a-b"), entry("gui/a/b")]);
        let order: Vec<String> = categories["gui"].iter().map(|e| e.relative_slash_path()).collect();
        assert_eq!(order, vec!["gui/a/b", "gui/a-b"]);
    }
}
