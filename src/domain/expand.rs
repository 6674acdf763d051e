//! Per-group expand/collapse state
//!
//! A group that has never been seen counts as collapsed. Boards seed every
//! loaded group as expanded so the first render shows the whole tree.

use std::collections::HashMap;

use super::id::GroupId;

/// Expand/collapse flags keyed by group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandState {
    flags: HashMap<GroupId, bool>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every given group expanded
    pub fn seed(&mut self, ids: impl IntoIterator<Item = GroupId>) {
        for id in ids {
            self.flags.insert(id, true);
        }
    }

    /// Flips a group's flag, returning the new value
    ///
    /// An unseen group counts as collapsed, so its first toggle expands it.
    pub fn toggle(&mut self, id: GroupId) -> bool {
        let flag = self.flags.entry(id).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn set(&mut self, id: GroupId, expanded: bool) {
        self.flags.insert(id, expanded);
    }

    pub fn is_expanded(&self, id: GroupId) -> bool {
        self.flags.get(&id).copied().unwrap_or(false)
    }

    /// Expands every group that has an entry
    pub fn expand_all(&mut self) {
        self.flags.values_mut().for_each(|flag| *flag = true);
    }

    /// Collapses every group that has an entry
    pub fn collapse_all(&mut self) {
        self.flags.values_mut().for_each(|flag| *flag = false);
    }

    /// Drops entries for groups that no longer exist
    pub fn retain(&mut self, mut keep: impl FnMut(GroupId) -> bool) {
        self.flags.retain(|id, _| keep(*id));
    }

    /// Number of groups with an entry
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<(GroupId, bool)> for ExpandState {
    fn from_iter<I: IntoIterator<Item = (GroupId, bool)>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}
