use crate::variable::{HeaderVariable, Interval, Variable};
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

/// Ids of header variables grouped by interval, as produced by
/// [`FileHeader::find_ids`] and consumed by the hide/remove operations.
pub type VariableGroups = IndexMap<Interval, Vec<u32>>;

/// Header data of one loaded result file.
///
/// Variables are stored per interval in insertion order, keyed by a numeric
/// id unique within that interval. Hidden variables move to a parallel map so
/// they can be restored; a variable is in exactly one of the two maps.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FileHeader {
    pub file_id: String,
    header: IndexMap<Interval, IndexMap<u32, HeaderVariable>>,
    hidden: IndexMap<Interval, IndexMap<u32, HeaderVariable>>,
}

impl FileHeader {
    pub fn new(file_id: &str, header: IndexMap<Interval, IndexMap<u32, HeaderVariable>>) -> Self {
        FileHeader {
            file_id: file_id.to_string(),
            header,
            hidden: IndexMap::new(),
        }
    }

    pub fn available_intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        self.header.keys().copied()
    }

    /// Ordered `(id, variable)` pairs for one interval. An interval absent
    /// from the file yields an empty sequence rather than an error.
    pub fn variables(&self, interval: Interval) -> Vec<(u32, &HeaderVariable)> {
        self.header
            .get(&interval)
            .map(|vars| vars.iter().map(|(id, var)| (*id, var)).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.header.values().all(|vars| vars.is_empty())
    }

    pub fn has_hidden(&self) -> bool {
        self.hidden.values().any(|vars| !vars.is_empty())
    }

    /// Insert a variable under the given id, replacing any previous occupant
    /// of that id. Used by the rename and aggregation flows, which mint a
    /// fresh id for the result.
    pub fn add_variable(&mut self, id: u32, variable: Variable) {
        let interval = variable.interval;
        debug_assert!(
            !self.hidden.get(&interval).is_some_and(|vars| vars.contains_key(&id)),
            "id {id} is already present in the hidden set of {interval}",
        );
        self.header
            .entry(interval)
            .or_default()
            .insert(id, HeaderVariable::from(variable));
    }

    /// Smallest unused id (>= 1) for an interval, considering both visible
    /// and hidden variables.
    pub fn next_id(&self, interval: Interval) -> u32 {
        let in_use = |id: u32| {
            self.header.get(&interval).is_some_and(|vars| vars.contains_key(&id))
                || self.hidden.get(&interval).is_some_and(|vars| vars.contains_key(&id))
        };
        (1u32..).find(|id| !in_use(*id)).unwrap_or(u32::MAX)
    }

    /// Move variables out of the visible header so they can be restored.
    pub fn hide(&mut self, groups: &VariableGroups) {
        for (interval, ids) in groups {
            let Some(vars) = self.header.get_mut(interval) else {
                continue;
            };
            for id in ids {
                if let Some(var) = vars.shift_remove(id) {
                    let replaced = self.hidden.entry(*interval).or_default().insert(*id, var);
                    debug_assert!(replaced.is_none(), "id {id} hidden twice for {interval}");
                }
            }
        }
    }

    /// Restore every hidden variable. Restored variables are appended after
    /// the currently visible ones of their interval.
    pub fn show_hidden(&mut self) {
        for (interval, vars) in std::mem::take(&mut self.hidden) {
            let visible = self.header.entry(interval).or_default();
            for (id, var) in vars {
                debug_assert!(!visible.contains_key(&id), "id {id} visible and hidden for {interval}");
                visible.insert(id, var);
            }
        }
    }

    /// Drop every hidden variable for good, reporting what was removed.
    pub fn remove_hidden(&mut self) -> Vec<Variable> {
        std::mem::take(&mut self.hidden)
            .into_iter()
            .flat_map(|(interval, vars)| {
                vars.into_values().map(move |var| var.to_variable(interval)).collect::<Vec<_>>()
            })
            .collect()
    }

    /// Remove variables from the visible header. Intervals left without any
    /// variable disappear from the header entirely.
    pub fn remove(&mut self, groups: &VariableGroups) {
        for (interval, ids) in groups {
            let Some(vars) = self.header.get_mut(interval) else {
                continue;
            };
            for id in ids {
                vars.shift_remove(id);
            }
            if vars.is_empty() {
                self.header.shift_remove(interval);
            }
        }
    }

    /// Value-based lookup of header ids for a set of variables. Variables
    /// without a match are silently skipped.
    pub fn find_ids(&self, variables: &[Variable]) -> VariableGroups {
        let mut groups = VariableGroups::new();
        for variable in variables {
            let Some(vars) = self.header.get(&variable.interval) else {
                continue;
            };
            let matched = vars.iter().find(|(_, var)| {
                var.key == variable.key && var.name == variable.name && var.units == variable.units
            });
            if let Some((id, _)) = matched {
                groups.entry(variable.interval).or_default().push(*id);
            }
        }
        groups
    }
}
