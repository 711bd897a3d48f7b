//! Expand/collapse state and the visible-row walk over a matrix row forest.
//!
//! Expansion state is a value: every operation returns a new `ExpansionSet`
//! and none of them touch the rows.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::resources::rows::{HierarchyDefect, ResourceRow};

/// Row ids whose children are revealed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionSet(BTreeSet<String>);

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, row_id: &str) -> bool {
        self.0.contains(row_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy of this set with `row_id` flipped: removed if present, added if absent.
    pub fn toggled(&self, row_id: &str) -> Self {
        let mut next = self.0.clone();
        if !next.remove(row_id) {
            next.insert(row_id.to_string());
        }
        Self(next)
    }
}

impl<S: Into<String>> FromIterator<S> for ExpansionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

pub fn toggle_expansion(expanded: &ExpansionSet, row_id: &str) -> ExpansionSet {
    expanded.toggled(row_id)
}

/// State after a fresh load: every root expanded.
pub fn default_expansion(rows: &[ResourceRow]) -> ExpansionSet {
    rows.iter()
        .filter(|r| r.is_root())
        .map(|r| r.row_id.clone())
        .collect()
}

/// Every row that has at least one child.
pub fn expand_all(rows: &[ResourceRow]) -> ExpansionSet {
    children_index(rows).into_keys().collect()
}

pub fn collapse_all() -> ExpansionSet {
    ExpansionSet::new()
}

/// Parent row id → indices of its children, in row order.
pub fn children_index(rows: &[ResourceRow]) -> HashMap<&str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        if let Some(parent_id) = row.parent_id.as_deref() {
            index.entry(parent_id).or_default().push(i);
        }
    }
    index
}

/// Checks any-depth forest shape: unique ids, resolvable parents and no
/// `parent_id` cycles. Each ancestor chain is walked once with a visited set.
pub fn check_hierarchy(rows: &[ResourceRow]) -> Result<(), HierarchyDefect> {
    let mut by_id: HashMap<&str, &ResourceRow> = HashMap::with_capacity(rows.len());
    for row in rows {
        if by_id.insert(row.row_id.as_str(), row).is_some() {
            return Err(HierarchyDefect::DuplicateRowId(row.row_id.clone()));
        }
    }

    // rows already known to lead to a root
    let mut grounded: HashSet<&str> = HashSet::with_capacity(rows.len());
    for row in rows {
        let mut chain: Vec<&str> = Vec::new();
        let mut on_chain: HashSet<&str> = HashSet::new();
        let mut current = row;
        loop {
            let id = current.row_id.as_str();
            if grounded.contains(id) {
                break;
            }
            if !on_chain.insert(id) {
                return Err(HierarchyDefect::Cycle(id.to_string()));
            }
            chain.push(id);
            let Some(parent_id) = current.parent_id.as_deref() else {
                break;
            };
            current = by_id
                .get(parent_id)
                .ok_or_else(|| HierarchyDefect::UnknownParent {
                    row_id: id.to_string(),
                    parent_id: parent_id.to_string(),
                })?;
        }
        grounded.extend(chain);
    }
    Ok(())
}

/// Rows to render given `expanded`, as a pre-order walk of the forest.
///
/// Roots are always visible. A row's children follow it, in row order, only
/// when the row is expanded, and the rule applies again below each child.
/// A malformed forest is reported instead of being partially rendered.
pub fn compute_visible_rows<'a>(
    rows: &'a [ResourceRow],
    expanded: &ExpansionSet,
) -> Result<Vec<&'a ResourceRow>, HierarchyDefect> {
    check_hierarchy(rows)?;
    let children = children_index(rows);

    let mut visible = Vec::with_capacity(rows.len());
    let mut emitted = vec![false; rows.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (root, _) in rows.iter().enumerate().filter(|(_, r)| r.is_root()) {
        stack.push(root);
        while let Some(i) = stack.pop() {
            let row = &rows[i];
            if std::mem::replace(&mut emitted[i], true) {
                return Err(HierarchyDefect::Cycle(row.row_id.clone()));
            }
            visible.push(row);
            if !expanded.contains(&row.row_id) {
                continue;
            }
            if let Some(kids) = children.get(row.row_id.as_str()) {
                stack.extend(kids.iter().rev());
            }
        }
    }
    Ok(visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::rows::{RowType, MONTHS};

    fn row(id: &str, parent: Option<&str>) -> ResourceRow {
        ResourceRow {
            row_id: id.to_string(),
            parent_id: parent.map(str::to_string),
            row_type: if parent.is_some() {
                RowType::Project
            } else {
                RowType::Person
            },
            name: id.to_string(),
            person: None,
            plan_mm: None,
            actual_mm: None,
            plan_months: [0.0; MONTHS],
            release: None,
        }
    }

    /// P1 with child A, P2 with no children, P3 with children B and C.
    fn forest() -> Vec<ResourceRow> {
        vec![
            row("P1", None),
            row("P1/A", Some("P1")),
            row("P2", None),
            row("P3", None),
            row("P3/B", Some("P3")),
            row("P3/C", Some("P3")),
        ]
    }

    fn ids<'a>(rows: &[&'a ResourceRow]) -> Vec<&'a str> {
        rows.iter().map(|r| r.row_id.as_str()).collect()
    }

    #[test]
    fn test_empty_expansion_shows_only_roots_in_order() {
        let rows = forest();
        let visible = compute_visible_rows(&rows, &collapse_all()).unwrap();
        assert_eq!(ids(&visible), vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_all_roots_expanded_shows_every_row_in_order() {
        let rows = forest();
        let visible = compute_visible_rows(&rows, &default_expansion(&rows)).unwrap();
        assert_eq!(visible.len(), rows.len());
        assert!(visible.iter().zip(rows.iter()).all(|(v, r)| *v == r));
    }

    #[test]
    fn test_single_expanded_root_scenario() {
        let rows = vec![row("P1", None), row("P1/A", Some("P1")), row("P2", None)];
        let expanded: ExpansionSet = ["P1"].into_iter().collect();
        let visible = compute_visible_rows(&rows, &expanded).unwrap();
        assert_eq!(ids(&visible), vec!["P1", "P1/A", "P2"]);
    }

    #[test]
    fn test_walk_is_not_limited_to_two_levels() {
        let rows = vec![
            row("a", None),
            row("b", Some("a")),
            row("c", Some("b")),
            row("d", Some("c")),
        ];
        let all: ExpansionSet = ["a", "b", "c"].into_iter().collect();
        assert_eq!(
            ids(&compute_visible_rows(&rows, &all).unwrap()),
            vec!["a", "b", "c", "d"]
        );
        let partial: ExpansionSet = ["a", "c"].into_iter().collect();
        assert_eq!(
            ids(&compute_visible_rows(&rows, &partial).unwrap()),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_visible_rows_are_a_subsequence_of_rows() {
        let rows = forest();
        let expanded: ExpansionSet = ["P3"].into_iter().collect();
        let visible = compute_visible_rows(&rows, &expanded).unwrap();
        let mut cursor = rows.iter();
        for v in &visible {
            assert!(cursor.any(|r| r == *v), "{} out of order", v.row_id);
        }
    }

    #[test]
    fn test_cycle_without_roots_is_malformed() {
        let rows = vec![row("X", Some("Y")), row("Y", Some("X"))];
        let result = compute_visible_rows(&rows, &ExpansionSet::new());
        assert!(matches!(result, Err(HierarchyDefect::Cycle(_))));
    }

    #[test]
    fn test_cycle_beside_a_valid_tree_is_malformed() {
        let mut rows = forest();
        rows.push(row("X", Some("Y")));
        rows.push(row("Y", Some("Z")));
        rows.push(row("Z", Some("X")));
        let result = compute_visible_rows(&rows, &default_expansion(&rows));
        assert!(matches!(result, Err(HierarchyDefect::Cycle(_))));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let rows = vec![row("X", Some("X"))];
        assert!(matches!(
            check_hierarchy(&rows),
            Err(HierarchyDefect::Cycle(_))
        ));
    }

    #[test]
    fn test_unknown_parent_and_duplicate_ids_are_malformed() {
        let orphan = vec![row("P1", None), row("P1/A", Some("P9"))];
        assert!(matches!(
            compute_visible_rows(&orphan, &ExpansionSet::new()),
            Err(HierarchyDefect::UnknownParent { .. })
        ));
        let duplicate = vec![row("P1", None), row("P1", None)];
        assert!(matches!(
            compute_visible_rows(&duplicate, &ExpansionSet::new()),
            Err(HierarchyDefect::DuplicateRowId(_))
        ));
    }

    #[test]
    fn test_visible_rows_is_idempotent_and_leaves_inputs_alone() {
        let rows = forest();
        let expanded: ExpansionSet = ["P1", "P3"].into_iter().collect();
        let rows_before = rows.clone();
        let expanded_before = expanded.clone();

        let first: Vec<ResourceRow> = compute_visible_rows(&rows, &expanded)
            .unwrap()
            .into_iter()
            .cloned()
            .collect();
        let second: Vec<ResourceRow> = compute_visible_rows(&rows, &expanded)
            .unwrap()
            .into_iter()
            .cloned()
            .collect();

        assert_eq!(first, second);
        assert_eq!(rows, rows_before);
        assert_eq!(expanded, expanded_before);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let original: ExpansionSet = ["P1", "P3"].into_iter().collect();
        for id in ["P1", "P2", "unknown"] {
            let once = toggle_expansion(&original, id);
            assert_ne!(once, original);
            assert_eq!(toggle_expansion(&once, id), original);
        }
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let empty = ExpansionSet::new();
        let added = toggle_expansion(&empty, "P1");
        assert!(added.contains("P1"));
        assert!(empty.is_empty());
        assert!(toggle_expansion(&added, "P1").is_empty());
    }

    #[test]
    fn test_expand_all_only_includes_rows_with_children() {
        let rows = forest();
        let all = expand_all(&rows);
        let mut expanded: Vec<_> = all.iter().collect();
        expanded.sort_unstable();
        assert_eq!(expanded, vec!["P1", "P3"]);
    }

    #[test]
    fn test_expansion_set_serializes_as_list() {
        let set: ExpansionSet = ["b", "a"].into_iter().collect();
        assert_eq!(serde_json::to_value(&set).unwrap(), serde_json::json!(["a", "b"]));
    }
}
