use crate::filter::filter_tree;
use crate::projection::project;
use crate::selection::{RowRef, reconcile};
use crate::tree::{TreeField, TreeNode, VariableRow, build_tree};
use indexmap::IndexSet;
use shared::units::UnitsSettings;
use shared::{FileHeader, HeaderVariable, Interval, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Outcome of selection reconciliation, surfaced to the caller. An empty
/// reconciliation is a normal result (the variables may have been removed)
/// and arrives as `Cleared`, never as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionUpdate {
    Selected { rows: Vec<RowRef>, missing: Vec<Variable> },
    Cleared,
}

/// Everything the widget layer needs to render after a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewUpdate {
    pub tree: Vec<TreeNode>,
    pub selection: SelectionUpdate,
    /// Labels of grouping rows to re-expand, in tree order.
    pub expanded: Vec<String>,
    /// Vertical scroll offset to restore. May overshoot the new tree; the
    /// widget clamps it.
    pub scroll_position: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct RebuildKey {
    interval: Interval,
    group_by: Option<TreeField>,
    units: UnitsSettings,
    totals: bool,
}

/// Per-tab view state.
///
/// Each open file tab owns one instance; nothing here is shared between
/// tabs. The standard/totals dataset choice is passed into every rebuild
/// instead of living in some global toggle, so concurrent tabs stay
/// independent.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Labels of currently expanded grouping rows, persisted across rebuilds.
    pub expanded: IndexSet<String>,
    /// Visual column order; the first column doubles as the grouping key and
    /// the selection match key.
    pub column_order: [TreeField; 3],
    pub sort: (TreeField, SortOrder),
    scroll_position: usize,
    last_build: Option<RebuildKey>,
    force_update: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            expanded: IndexSet::new(),
            column_order: [TreeField::Name, TreeField::Key, TreeField::Units],
            sort: (TreeField::Name, SortOrder::Ascending),
            scroll_position: 0,
            last_build: None,
            force_update: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field used for tree grouping and selection matching.
    pub fn group_field(&self) -> TreeField {
        self.column_order[0]
    }

    /// Whether a fresh model is required for the given inputs. Restoring
    /// selection, expansion and scroll does not require a rebuild on its own.
    pub fn needs_rebuild(
        &self,
        interval: Interval,
        units: &UnitsSettings,
        tree: bool,
        totals: bool,
    ) -> bool {
        if self.force_update {
            return true;
        }
        let group_by = tree.then(|| self.group_field());
        match &self.last_build {
            None => true,
            Some(last) => {
                last.interval != interval
                    || last.group_by != group_by
                    || last.units != *units
                    || last.totals != totals
            }
        }
    }

    /// Mark the next rebuild as unconditional (header mutated in place).
    pub fn set_force_update(&mut self) {
        self.force_update = true;
    }

    /// Build the display tree for one interval of a header and reconcile the
    /// previous selection against it.
    #[allow(clippy::too_many_arguments)]
    pub fn rebuild(
        &mut self,
        header: &FileHeader,
        interval: Interval,
        units: &UnitsSettings,
        tree: bool,
        totals: bool,
        filter: &str,
        previous_selection: &[Variable],
    ) -> ViewUpdate {
        let group_by = tree.then(|| self.group_field());

        let (ids, raw): (Vec<u32>, Vec<HeaderVariable>) = header
            .variables(interval)
            .into_iter()
            .map(|(id, var)| (id, var.clone()))
            .unzip();
        let proxies = project(&raw, units);
        let rows: Vec<VariableRow> = ids
            .into_iter()
            .zip(raw)
            .zip(proxies)
            .map(|((id, raw), proxy)| VariableRow { id, raw, proxy })
            .collect();

        let nodes = build_tree(rows, group_by);
        let nodes = filter_tree(&nodes, filter);

        let reconciled = reconcile(previous_selection, &nodes, self.group_field());
        let selection = if reconciled.rows.is_empty() {
            SelectionUpdate::Cleared
        } else {
            SelectionUpdate::Selected { rows: reconciled.rows, missing: reconciled.missing }
        };

        let expanded = nodes
            .iter()
            .filter_map(|node| match node {
                TreeNode::Branch { label, .. } if self.expanded.contains(label) => {
                    Some(label.clone())
                }
                _ => None,
            })
            .collect();

        self.last_build = Some(RebuildKey {
            interval,
            group_by,
            units: units.clone(),
            totals,
        });
        self.force_update = false;

        ViewUpdate {
            tree: nodes,
            selection,
            expanded,
            scroll_position: self.scroll_position,
        }
    }

    /// First row showing the given variable, e.g. to scroll a freshly
    /// renamed variable into view.
    pub fn scroll_to(&self, tree: &[TreeNode], variable: &Variable) -> Option<RowRef> {
        reconcile(std::slice::from_ref(variable), tree, self.group_field())
            .rows
            .first()
            .copied()
    }

    pub fn record_expanded(&mut self, label: &str) {
        self.expanded.insert(label.to_string());
    }

    pub fn record_collapsed(&mut self, label: &str) {
        self.expanded.shift_remove(label);
    }

    pub fn record_scroll(&mut self, position: usize) {
        self.scroll_position = position;
    }

    pub fn record_sort(&mut self, field: TreeField, order: SortOrder) {
        self.sort = (field, order);
    }

    /// Move a column to the front, keeping the relative order of the rest.
    /// The front column becomes the grouping and match key, so a tree view
    /// needs a rebuild afterwards.
    pub fn move_column_front(&mut self, field: TreeField) {
        if self.column_order[0] == field {
            return;
        }
        let mut order = vec![field];
        order.extend(self.column_order.iter().copied().filter(|f| *f != field));
        self.column_order = [order[0], order[1], order[2]];
    }
}
