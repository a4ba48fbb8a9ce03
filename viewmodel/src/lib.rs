//! Display adapter between file headers and the variable view.
//!
//! Everything here is synchronous and allocation-light: a rebuild projects
//! header variables into display units, groups them into a two-level tree,
//! filters the tree, and reconciles the previous selection against the new
//! structure. Each rebuild produces a fresh tree; nothing is mutated in
//! place, so no locking is needed anywhere in this crate.

pub mod filter;
pub mod projection;
pub mod selection;
pub mod tree;
pub mod view;

pub use filter::filter_tree;
pub use projection::project;
pub use selection::{Reconciliation, RowRef, expand_parent_selection, reconcile};
pub use tree::{TreeField, TreeNode, VariableRow, build_tree};
pub use view::{SelectionUpdate, SortOrder, ViewState, ViewUpdate};
