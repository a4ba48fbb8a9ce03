use crate::tree::{TreeNode, VariableRow};

/// Filter the tree by a substring pattern.
///
/// A blank or whitespace-only pattern keeps everything. A leaf matches when
/// the lowercase pattern occurs in its displayed fields joined with spaces;
/// grouping nodes never match on their own label and survive only while at
/// least one child matches. A branch reduced to a single child stays a
/// branch; singleton collapsing happens at build time, not here.
pub fn filter_tree(tree: &[TreeNode], pattern: &str) -> Vec<TreeNode> {
    let needle = pattern.trim().to_lowercase();
    if needle.is_empty() {
        return tree.to_vec();
    }

    tree.iter()
        .filter_map(|node| match node {
            TreeNode::Leaf(row) => row_matches(row, &needle).then(|| node.clone()),
            TreeNode::Branch { label, children } => {
                let children: Vec<VariableRow> = children
                    .iter()
                    .filter(|row| row_matches(row, &needle))
                    .cloned()
                    .collect();
                if children.is_empty() {
                    None
                } else {
                    Some(TreeNode::Branch { label: label.clone(), children })
                }
            }
        })
        .collect()
}

fn row_matches(row: &VariableRow, needle: &str) -> bool {
    let haystack = format!("{} {} {}", row.proxy.key, row.proxy.name, row.proxy.units);
    haystack.to_lowercase().contains(needle)
}
