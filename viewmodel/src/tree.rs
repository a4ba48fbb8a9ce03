use indexmap::IndexMap;
use shared::{HeaderVariable, ProxyVariable};
use std::fmt;
use std::str::FromStr;

/// One of the three display fields of a variable.
///
/// Serves as the explicit accessor wherever a field is chosen at runtime
/// (grouping key, selection match key, first view column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeField {
    Key,
    Name,
    Units,
}

impl TreeField {
    pub fn of<'a>(&self, proxy: &'a ProxyVariable) -> &'a str {
        match self {
            TreeField::Key => &proxy.key,
            TreeField::Name => &proxy.name,
            TreeField::Units => &proxy.units,
        }
    }

    pub fn of_raw<'a>(&self, raw: &'a HeaderVariable) -> &'a str {
        match self {
            TreeField::Key => &raw.key,
            TreeField::Name => &raw.name,
            TreeField::Units => &raw.units,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TreeField::Key => "key",
            TreeField::Name => "variable",
            TreeField::Units => "units",
        }
    }
}

impl fmt::Display for TreeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view field: '{0}'")]
pub struct ParseTreeFieldError(String);

impl FromStr for TreeField {
    type Err = ParseTreeFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key" => Ok(TreeField::Key),
            "variable" => Ok(TreeField::Name),
            "units" => Ok(TreeField::Units),
            other => Err(ParseTreeFieldError(other.to_string())),
        }
    }
}

/// One selectable leaf: the stored variable, its header id and its display
/// projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRow {
    pub id: u32,
    pub raw: HeaderVariable,
    pub proxy: ProxyVariable,
}

/// A top-level row of the view: either a plain variable or a grouping node
/// with variable children. Nesting never goes deeper than one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Leaf(VariableRow),
    Branch { label: String, children: Vec<VariableRow> },
}

impl TreeNode {
    pub fn is_branch(&self) -> bool {
        matches!(self, TreeNode::Branch { .. })
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Branch { children, .. } => children.len(),
        }
    }
}

/// Group rows into the display tree.
///
/// With no grouping key the rows come back as a flat list. Otherwise rows
/// are bucketed by the chosen field of the *proxy* record, so variables
/// whose units differ only before conversion share a bucket. Buckets keep
/// first-seen order, members keep input order, and a bucket of one is
/// emitted as a plain top-level leaf instead of a single-child parent.
pub fn build_tree(rows: Vec<VariableRow>, group_by: Option<TreeField>) -> Vec<TreeNode> {
    let Some(field) = group_by else {
        return rows.into_iter().map(TreeNode::Leaf).collect();
    };

    let mut buckets: IndexMap<String, Vec<VariableRow>> = IndexMap::new();
    for row in rows {
        let label = field.of(&row.proxy).to_string();
        buckets.entry(label).or_default().push(row);
    }

    buckets
        .into_iter()
        .map(|(label, mut members)| {
            if members.len() == 1 {
                TreeNode::Leaf(members.remove(0))
            } else {
                TreeNode::Branch { label, children: members }
            }
        })
        .collect()
}
