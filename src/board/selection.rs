//! Row selection for bulk actions

use std::collections::HashSet;

use crate::domain::{GroupId, RowKey, TaskId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    groups: HashSet<GroupId>,
    tasks: HashSet<TaskId>,
}

impl Selection {
    /// Flips a row's selection; placeholders are never selectable
    pub fn toggle(&mut self, key: RowKey) -> bool {
        match key {
            RowKey::Group(id) => flip(&mut self.groups, id),
            RowKey::Task(id) => flip(&mut self.tasks, id),
            RowKey::AddGroup | RowKey::AddTask => false,
        }
    }

    pub fn contains(&self, key: RowKey) -> bool {
        match key {
            RowKey::Group(id) => self.groups.contains(&id),
            RowKey::Task(id) => self.tasks.contains(&id),
            RowKey::AddGroup | RowKey::AddTask => false,
        }
    }

    pub fn insert_group(&mut self, id: GroupId) {
        self.groups.insert(id);
    }

    pub fn insert_task(&mut self, id: TaskId) {
        self.tasks.insert(id);
    }

    pub fn groups(&self) -> &HashSet<GroupId> {
        &self.groups
    }

    pub fn tasks(&self) -> &HashSet<TaskId> {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.groups.len() + self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.tasks.clear();
    }

    /// Drops everything that no longer exists
    pub fn retain(
        &mut self,
        group_exists: impl Fn(GroupId) -> bool,
        task_exists: impl Fn(TaskId) -> bool,
    ) {
        self.groups.retain(|id| group_exists(*id));
        self.tasks.retain(|id| task_exists(*id));
    }
}

fn flip<T: std::hash::Hash + Eq>(set: &mut HashSet<T>, item: T) -> bool {
    if set.remove(&item) {
        false
    } else {
        set.insert(item);
        true
    }
}
