//! Materialized-path arithmetic for the category tree.
//!
//! Every category stores the ids from the root down to itself, e.g. `/1/5/9/`
//! for category 9 whose parent is 5 whose parent is the root 1. The subtree
//! of a category is every row whose path starts with its own path.

use crate::model::Category;
use std::collections::HashMap;

pub fn child_path(parent_path: Option<&str>, id: i32) -> String {
    match parent_path {
        Some(parent) => format!("{parent}{id}/"),
        None => format!("/{id}/"),
    }
}

/// Root categories have depth 0.
pub fn depth_of(path: &str) -> i32 {
    let segments = path.split('/').filter(|s| !s.is_empty()).count() as i32;
    (segments - 1).max(0)
}

/// True when `path` is the path of category `id` or of one of its descendants.
pub fn is_within(path: &str, id: i32) -> bool {
    path.contains(&format!("/{id}/"))
}

/// Rejects moving category `id` under `new_parent_path` when that would
/// create a cycle.
pub fn can_reparent(id: i32, new_parent_id: i32, new_parent_path: &str) -> bool {
    new_parent_id != id && !is_within(new_parent_path, id)
}

/// Replaces the `old_prefix` of a descendant path with `new_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    path.strip_prefix(old_prefix)
        .map(|rest| format!("{new_prefix}{rest}"))
}

/// Ids from the root down to the category itself.
pub fn ancestry(path: &str) -> Vec<i32> {
    path.split('/').filter_map(|s| s.parse().ok()).collect()
}

/// Orders categories depth-first: parents before their children, siblings
/// by name. `names` holds the name of every id found in the paths.
pub fn sort_tree(categories: &mut [Category], names: &HashMap<i32, String>) {
    categories.sort_by_cached_key(|category| {
        ancestry(&category.path)
            .into_iter()
            .map(|id| (names.get(&id).cloned().unwrap_or_default(), id))
            .collect::<Vec<_>>()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn node(id: i32, name: &str, path: &str) -> Category {
        let now = Utc::now();
        Category {
            category_id: id,
            name: name.into(),
            slug: name.to_lowercase(),
            is_active: true,
            parent_id: None,
            description: None,
            category_image: None,
            path: path.into(),
            depth: depth_of(path),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn builds_child_paths() {
        assert_eq!(child_path(None, 4), "/4/");
        assert_eq!(child_path(Some("/4/"), 11), "/4/11/");
        assert_eq!(depth_of("/4/"), 0);
        assert_eq!(depth_of("/4/11/30/"), 2);
    }

    #[test]
    fn does_not_confuse_id_prefixes() {
        assert!(is_within("/1/12/", 12));
        assert!(!is_within("/1/12/", 2));
        assert!(!is_within("/11/", 1));
    }

    #[test]
    fn refuses_cycles() {
        // 3 is a descendant of 1, so 1 cannot move under 3.
        assert!(!can_reparent(1, 3, "/1/2/3/"));
        assert!(!can_reparent(5, 5, "/5/"));
        assert!(can_reparent(3, 7, "/7/"));
    }

    #[test]
    fn rebases_subtree_paths() {
        assert_eq!(
            rebase("/1/2/3/", "/1/2/", "/9/2/").as_deref(),
            Some("/9/2/3/")
        );
        assert_eq!(rebase("/4/5/", "/1/2/", "/9/2/"), None);
    }

    #[test]
    fn reads_ancestry_from_paths() {
        assert_eq!(ancestry("/1/12/30/"), vec![1, 12, 30]);
        assert!(ancestry("/").is_empty());
    }

    #[test]
    fn tree_order_sorts_siblings_by_name() {
        let mut categories = vec![
            node(1, "Zinc", "/1/"),
            node(3, "Yams", "/1/3/"),
            node(4, "Alloys", "/1/4/"),
            node(10, "Bananas", "/10/"),
            node(2, "Apples", "/2/"),
        ];
        let names: HashMap<i32, String> = categories
            .iter()
            .map(|c| (c.category_id, c.name.clone()))
            .collect();

        sort_tree(&mut categories, &names);

        let order: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["Apples", "Bananas", "Zinc", "Alloys", "Yams"]);
    }

    #[test]
    fn filtered_children_follow_their_parents_name_order() {
        // Only the children matched; their parents are known by name alone.
        let mut categories = vec![node(5, "Cloves", "/9/5/"), node(6, "Barley", "/2/6/")];
        let names = HashMap::from([
            (9, "Spices".to_string()),
            (2, "Grains".to_string()),
            (5, "Cloves".to_string()),
            (6, "Barley".to_string()),
        ]);

        sort_tree(&mut categories, &names);

        assert_eq!(categories[0].category_id, 6);
        assert_eq!(categories[1].category_id, 5);
    }
}
