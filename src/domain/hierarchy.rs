//! Group hierarchy for a project
//!
//! Indexes the flat group and task lists once: parent -> child groups and
//! group -> tasks, both in input order. The tree builder and the deletion
//! planner walk these maps instead of rescanning the lists per node.
//!
//! Move validation and cycle reporting use petgraph over the parent edges.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use thiserror::Error;

use super::group::TaskGroup;
use super::id::{GroupId, TaskId};
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum HierarchyError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("A group cannot be its own parent: {0}")]
    SelfParent(GroupId),

    #[error("Moving group {group} under {parent} would create a cycle")]
    CycleDetected { group: GroupId, parent: GroupId },
}

/// Indexed view over one project's groups and tasks
#[derive(Debug)]
pub struct GroupForest<'a> {
    groups: HashMap<GroupId, &'a TaskGroup>,

    /// Groups with no parent, in input order
    roots: Vec<GroupId>,

    /// Child groups per parent, in input order
    children: HashMap<GroupId, Vec<GroupId>>,

    /// Tasks per group, in input order
    tasks: HashMap<GroupId, Vec<&'a Task>>,
}

impl<'a> GroupForest<'a> {
    /// Builds the adjacency maps
    pub fn new(groups: &'a [TaskGroup], tasks: &'a [Task]) -> Self {
        let mut index = HashMap::with_capacity(groups.len());
        let mut roots = Vec::new();
        let mut children: HashMap<GroupId, Vec<GroupId>> = HashMap::new();

        for group in groups {
            // First occurrence wins if the input repeats an id
            if index.contains_key(&group.id) {
                continue;
            }
            index.insert(group.id, group);
            match group.parent_id {
                None => roots.push(group.id),
                Some(parent) => children.entry(parent).or_default().push(group.id),
            }
        }

        let mut by_group: HashMap<GroupId, Vec<&'a Task>> = HashMap::new();
        for task in tasks {
            if let Some(group_id) = task.group_id {
                by_group.entry(group_id).or_default().push(task);
            }
        }

        Self {
            groups: index,
            roots,
            children,
            tasks: by_group,
        }
    }

    /// Root groups in input order
    pub fn roots(&self) -> &[GroupId] {
        &self.roots
    }

    /// Direct child groups in input order
    pub fn children(&self, id: GroupId) -> &[GroupId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tasks directly in a group, in input order
    pub fn tasks_in(&self, id: GroupId) -> &[&'a Task] {
        self.tasks.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group(&self, id: GroupId) -> Option<&'a TaskGroup> {
        self.groups.get(&id).copied()
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Tasks that reference a group that does not exist
    pub fn dangling_tasks(&self) -> Vec<TaskId> {
        let mut dangling: Vec<_> = self
            .tasks
            .iter()
            .filter(|(group_id, _)| !self.groups.contains_key(group_id))
            .flat_map(|(_, tasks)| tasks.iter().map(|t| t.id))
            .collect();
        dangling.sort();
        dangling
    }

    /// Plans deletion of a group and everything below it
    ///
    /// Steps are in post-order: for each group, its child groups' steps
    /// come first, then its own tasks, then the group itself.
    pub fn deletion_plan(&self, id: GroupId) -> Result<DeletionPlan, HierarchyError> {
        if !self.contains(id) {
            return Err(HierarchyError::GroupNotFound(id));
        }

        let mut steps = Vec::new();
        let mut visited = HashSet::new();
        self.plan_group(id, None, &mut visited, &mut steps);

        Ok(DeletionPlan { root: id, steps })
    }

    fn plan_group(
        &self,
        id: GroupId,
        parent: Option<GroupId>,
        visited: &mut HashSet<GroupId>,
        steps: &mut Vec<DeleteStep>,
    ) {
        if !visited.insert(id) {
            return;
        }

        for &child in self.children(id) {
            self.plan_group(child, Some(id), visited, steps);
        }

        for task in self.tasks_in(id) {
            steps.push(DeleteStep::Task {
                id: task.id,
                group: id,
            });
        }

        steps.push(DeleteStep::Group { id, parent });
    }

    /// Checks that `group` may be re-parented under `new_parent`
    pub fn check_move(
        &self,
        group: GroupId,
        new_parent: Option<GroupId>,
    ) -> Result<(), HierarchyError> {
        if !self.contains(group) {
            return Err(HierarchyError::GroupNotFound(group));
        }

        let Some(parent) = new_parent else {
            return Ok(());
        };

        if parent == group {
            return Err(HierarchyError::SelfParent(group));
        }
        if !self.contains(parent) {
            return Err(HierarchyError::GroupNotFound(parent));
        }

        let (graph, nodes) = self.parent_graph();
        if has_path_connecting(&graph, nodes[&group], nodes[&parent], None) {
            return Err(HierarchyError::CycleDetected { group, parent });
        }

        Ok(())
    }

    /// Groups that sit on a parent cycle
    ///
    /// Such groups have no root and never appear on a board.
    pub fn cyclic_groups(&self) -> Vec<GroupId> {
        let (graph, _) = self.parent_graph();

        let mut cyclic: Vec<GroupId> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || graph.contains_edge(component[0], component[0])
            })
            .flatten()
            .map(|idx| graph[idx])
            .collect();
        cyclic.sort();
        cyclic
    }

    /// Directed graph with an edge parent -> child for every known pair
    fn parent_graph(&self) -> (DiGraph<GroupId, ()>, HashMap<GroupId, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::with_capacity(self.groups.len());

        for &id in self.groups.keys() {
            nodes.insert(id, graph.add_node(id));
        }

        for group in self.groups.values() {
            if let Some(parent) = group.parent_id {
                if let Some(&parent_idx) = nodes.get(&parent) {
                    graph.add_edge(parent_idx, nodes[&group.id], ());
                }
            }
        }

        (graph, nodes)
    }
}

/// One store call in a deletion plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeleteStep {
    Task { id: TaskId, group: GroupId },

    /// `parent` is the enclosing group within the plan, `None` for the target
    Group { id: GroupId, parent: Option<GroupId> },
}

/// Ordered store calls that remove a group subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionPlan {
    pub root: GroupId,
    pub steps: Vec<DeleteStep>,
}

impl DeletionPlan {
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.steps.iter().filter_map(|step| match step {
            DeleteStep::Task { id, .. } => Some(*id),
            DeleteStep::Group { .. } => None,
        })
    }

    pub fn group_ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.steps.iter().filter_map(|step| match step {
            DeleteStep::Group { id, .. } => Some(*id),
            DeleteStep::Task { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
