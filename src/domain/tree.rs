//! Board rows: the nested group/task tree flattened for display
//!
//! [`build_rows`] turns the flat group and task lists into an ordered row
//! sequence. Hierarchy survives as each row's `level`; collapsed groups hide
//! everything below them. A pending add shows up as a placeholder row where
//! the new item will land.
//!
//! Tasks whose group does not exist, and ungrouped tasks, are never shown.

use std::collections::HashSet;

use serde::Serialize;

use super::expand::ExpandState;
use super::group::TaskGroup;
use super::hierarchy::GroupForest;
use super::id::{GroupId, TaskId};
use super::task::Task;

/// The single in-flight add request on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAdd {
    /// New group under `parent`, or at the root
    Group { parent: Option<GroupId> },
    /// New task in `group`
    Task { group: GroupId },
}

impl PendingAdd {
    /// Label for messages ("group" or "task")
    pub fn noun(&self) -> &'static str {
        match self {
            PendingAdd::Group { .. } => "group",
            PendingAdd::Task { .. } => "task",
        }
    }
}

/// What a row shows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowKind<'a> {
    Group { group: &'a TaskGroup, expanded: bool },
    Task { task: &'a Task },
    AddGroup { parent: Option<GroupId> },
    AddTask { group: GroupId },
}

/// One renderable line on the board
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Row<'a> {
    pub level: usize,
    #[serde(flatten)]
    pub kind: RowKind<'a>,
}

/// Stable identity of a row across rebuilds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    Group(GroupId),
    Task(TaskId),
    AddGroup,
    AddTask,
}

impl Row<'_> {
    pub fn key(&self) -> RowKey {
        match self.kind {
            RowKind::Group { group, .. } => RowKey::Group(group.id),
            RowKind::Task { task } => RowKey::Task(task.id),
            RowKind::AddGroup { .. } => RowKey::AddGroup,
            RowKind::AddTask { .. } => RowKey::AddTask,
        }
    }

    /// Returns true for add-group and add-task rows
    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, RowKind::AddGroup { .. } | RowKind::AddTask { .. })
    }

    /// Display name, empty for placeholders
    pub fn name(&self) -> &str {
        match self.kind {
            RowKind::Group { group, .. } => &group.name,
            RowKind::Task { task } => &task.name,
            RowKind::AddGroup { .. } | RowKind::AddTask { .. } => "",
        }
    }
}

/// Flattens a project's groups and tasks into display rows
///
/// Depth-first from the root groups. Each group row is followed, when the
/// group is expanded, by its child groups, then its tasks, then the add-task
/// placeholder if one targets it. An add-group placeholder for a group comes
/// right after that group's subtree, expanded or not. A root add-group
/// placeholder comes last.
///
/// Sibling order follows input order. A group is never entered twice, so
/// cyclic parent references cannot loop.
pub fn build_rows<'a>(
    groups: &'a [TaskGroup],
    tasks: &'a [Task],
    expanded: &ExpandState,
    pending: Option<&PendingAdd>,
) -> Vec<Row<'a>> {
    let forest = GroupForest::new(groups, tasks);
    let mut builder = RowBuilder {
        forest: &forest,
        expanded,
        pending,
        visited: HashSet::new(),
        rows: Vec::with_capacity(groups.len() + tasks.len() + 1),
    };

    for &root in forest.roots() {
        builder.push_group(root, 0);
    }

    if let Some(PendingAdd::Group { parent: None }) = pending {
        builder.rows.push(Row {
            level: 0,
            kind: RowKind::AddGroup { parent: None },
        });
    }

    builder.rows
}

struct RowBuilder<'f, 'a> {
    forest: &'f GroupForest<'a>,
    expanded: &'f ExpandState,
    pending: Option<&'f PendingAdd>,
    visited: HashSet<GroupId>,
    rows: Vec<Row<'a>>,
}

impl<'a> RowBuilder<'_, 'a> {
    fn push_group(&mut self, id: GroupId, level: usize) {
        if !self.visited.insert(id) {
            return;
        }
        let forest = self.forest;
        let Some(group) = forest.group(id) else {
            return;
        };

        let expanded = self.expanded.is_expanded(id);
        self.rows.push(Row {
            level,
            kind: RowKind::Group { group, expanded },
        });

        if expanded {
            for &child in forest.children(id) {
                self.push_group(child, level + 1);
            }

            for &task in forest.tasks_in(id) {
                self.rows.push(Row {
                    level: level + 1,
                    kind: RowKind::Task { task },
                });
            }

            if self.pending == Some(&PendingAdd::Task { group: id }) {
                self.rows.push(Row {
                    level: level + 1,
                    kind: RowKind::AddTask { group: id },
                });
            }
        }

        if self.pending == Some(&PendingAdd::Group { parent: Some(id) }) {
            self.rows.push(Row {
                level: level + 1,
                kind: RowKind::AddGroup { parent: Some(id) },
            });
        }
    }
}
