use crate::tree::{TreeField, TreeNode};
use shared::Variable;
use std::collections::HashSet;

/// Position of a selectable row in the tree. Grouping nodes are structural
/// and never referenced by a `RowRef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRef {
    pub top: usize,
    pub child: Option<usize>,
}

impl RowRef {
    pub fn top_level(top: usize) -> Self {
        RowRef { top, child: None }
    }

    pub fn nested(top: usize, child: usize) -> Self {
        RowRef { top, child: Some(child) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Rows to select in the new tree.
    pub rows: Vec<RowRef>,
    /// Previously selected variables with no counterpart in the new tree.
    pub missing: Vec<Variable>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Re-find a previous selection in a freshly built tree.
///
/// Matching is by `(key, name)` value equality; numeric ids are not stable
/// across rename and aggregation and are never consulted. Top-level rows are
/// pre-filtered against the `match_field` values of the old selection before
/// leaves are tested in full. Units are excluded from that pre-filter: the
/// tree shows converted units while the selection stores source units, and a
/// variable with rewritten units must still be found through `(key, name)`.
pub fn reconcile(
    previous: &[Variable],
    tree: &[TreeNode],
    match_field: TreeField,
) -> Reconciliation {
    if previous.is_empty() {
        return Reconciliation::default();
    }

    let wanted: HashSet<(&str, &str)> =
        previous.iter().map(|var| (var.key.as_str(), var.name.as_str())).collect();
    let quick: Option<HashSet<&str>> = match match_field {
        TreeField::Key => Some(previous.iter().map(|var| var.key.as_str()).collect()),
        TreeField::Name => Some(previous.iter().map(|var| var.name.as_str()).collect()),
        TreeField::Units => None,
    };

    let mut rows = Vec::new();
    let mut matched: HashSet<(&str, &str)> = HashSet::new();

    for (top, node) in tree.iter().enumerate() {
        match node {
            TreeNode::Leaf(row) => {
                if let Some(quick) = &quick {
                    if !quick.contains(match_field.of_raw(&row.raw)) {
                        continue;
                    }
                }
                let pair = (row.raw.key.as_str(), row.raw.name.as_str());
                if wanted.contains(&pair) {
                    rows.push(RowRef::top_level(top));
                    matched.insert(pair);
                }
            }
            TreeNode::Branch { label, children } => {
                if let Some(quick) = &quick {
                    // A grouping row must be descended whenever it could hold
                    // a selected variable. Its label is only a match-field
                    // value when the tree is grouped by that field, so a
                    // label miss alone is not enough to skip the group.
                    let label_hit = quick.contains(label.as_str());
                    if !label_hit
                        && !children
                            .iter()
                            .any(|row| quick.contains(match_field.of_raw(&row.raw)))
                    {
                        continue;
                    }
                }
                for (child, row) in children.iter().enumerate() {
                    let pair = (row.raw.key.as_str(), row.raw.name.as_str());
                    if wanted.contains(&pair) {
                        rows.push(RowRef::nested(top, child));
                        matched.insert(pair);
                    }
                }
            }
        }
    }

    let missing = previous
        .iter()
        .filter(|var| !matched.contains(&(var.key.as_str(), var.name.as_str())))
        .cloned()
        .collect();

    Reconciliation { rows, missing }
}

/// Resolve a click on an expanded grouping row.
///
/// Selecting the parent itself is never valid; the click selects all of its
/// children instead, unless some child is already part of the selection (a
/// multi-selection that descended into the group keeps only what the user
/// picked).
pub fn expand_parent_selection(
    tree: &[TreeNode],
    top: usize,
    selected: &[RowRef],
) -> Vec<RowRef> {
    let Some(TreeNode::Branch { children, .. }) = tree.get(top) else {
        return Vec::new();
    };
    let child_already_selected =
        selected.iter().any(|row| row.top == top && row.child.is_some());
    if child_already_selected {
        return Vec::new();
    }
    (0..children.len()).map(|child| RowRef::nested(top, child)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_tree, tests::row};
    use shared::Interval;

    fn var(key: &str, name: &str, units: &str) -> Variable {
        Variable::new(Interval::Daily, key, name, units)
    }

    fn grouped_tree() -> Vec<TreeNode> {
        build_tree(
            vec![
                row(1, "Zone1", "Temperature", "C", "C"),
                row(2, "Zone2", "Temperature", "C", "C"),
                row(3, "Zone1", "Energy", "J", "kWh"),
            ],
            Some(TreeField::Name),
        )
    }

    #[test]
    fn test_selection_found_in_branch() {
        let tree = grouped_tree();
        let result = reconcile(&[var("Zone2", "Temperature", "C")], &tree, TreeField::Name);
        assert_eq!(result.rows, vec![RowRef::nested(0, 1)]);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_selection_found_in_flat_leaf() {
        // "Energy" forms a singleton bucket and is emitted flat
        let tree = grouped_tree();
        let result = reconcile(&[var("Zone1", "Energy", "J")], &tree, TreeField::Name);
        assert_eq!(result.rows, vec![RowRef::top_level(1)]);
    }

    #[test]
    fn test_no_match_reports_missing() {
        let tree = grouped_tree();
        let gone = var("Deleted", "Variable", "C");
        let result = reconcile(&[gone.clone()], &tree, TreeField::Name);
        assert!(result.is_empty());
        assert_eq!(result.missing, vec![gone]);
    }

    #[test]
    fn test_ids_are_ignored() {
        // same variables, entirely different ids after a header mutation
        let tree = build_tree(
            vec![
                row(90, "Zone1", "Temperature", "C", "C"),
                row(91, "Zone2", "Temperature", "C", "C"),
            ],
            Some(TreeField::Name),
        );
        let result = reconcile(&[var("Zone1", "Temperature", "C")], &tree, TreeField::Name);
        assert_eq!(result.rows, vec![RowRef::nested(0, 0)]);
    }

    #[test]
    fn test_units_match_field_survives_conversion() {
        // selection stores source units "J" but the tree groups by the
        // displayed "kWh"; the leaf must still be found
        let tree = build_tree(
            vec![
                row(1, "Zone1", "Energy", "J", "kWh"),
                row(2, "Zone2", "Energy", "J", "kWh"),
            ],
            Some(TreeField::Units),
        );
        let result = reconcile(&[var("Zone1", "Energy", "J")], &tree, TreeField::Units);
        assert_eq!(result.rows, vec![RowRef::nested(0, 0)]);
    }

    #[test]
    fn test_completeness_over_subsets() {
        let rows = vec![
            row(1, "K1", "V1", "C", "C"),
            row(2, "K1", "V2", "C", "C"),
            row(3, "K2", "V1", "J", "kWh"),
            row(4, "K3", "V3", "J", "kWh"),
        ];
        let all: Vec<Variable> = rows
            .iter()
            .map(|r| var(&r.raw.key, &r.raw.name, &r.raw.units))
            .collect();

        for group_by in [None, Some(TreeField::Key), Some(TreeField::Name), Some(TreeField::Units)] {
            for match_field in [TreeField::Key, TreeField::Name, TreeField::Units] {
                let tree = build_tree(rows.clone(), group_by);
                for mask in 0..(1 << all.len()) {
                    let subset: Vec<Variable> = all
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| mask & (1 << i) != 0)
                        .map(|(_, v)| v.clone())
                        .collect();
                    let result = reconcile(&subset, &tree, match_field);
                    assert_eq!(
                        result.rows.len(),
                        subset.len(),
                        "subset {mask:b}, group_by {group_by:?}, match {match_field:?}",
                    );
                    assert!(result.missing.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_parent_click_selects_children() {
        let tree = grouped_tree();
        let rows = expand_parent_selection(&tree, 0, &[]);
        assert_eq!(rows, vec![RowRef::nested(0, 0), RowRef::nested(0, 1)]);
    }

    #[test]
    fn test_parent_click_keeps_partial_child_selection() {
        let tree = grouped_tree();
        let rows = expand_parent_selection(&tree, 0, &[RowRef::nested(0, 1)]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parent_click_on_leaf_is_noop() {
        let tree = grouped_tree();
        assert!(expand_parent_selection(&tree, 1, &[]).is_empty());
    }
}
