//! Executing a deletion plan against a repository
//!
//! Steps run one at a time in plan order. A failed step does not stop the
//! run, but a group is only deleted once everything planned below it is
//! gone; otherwise it is reported as blocked and its own parent is blocked
//! in turn. A record the store no longer has counts as deleted.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{DeleteStep, DeletionPlan, GroupId, TaskId};
use crate::storage::{Repository, StoreError};

/// A record a delete call targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeleteTarget {
    Group { id: GroupId },
    Task { id: TaskId },
}

impl std::fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteTarget::Group { id } => write!(f, "group {}", id),
            DeleteTarget::Task { id } => write!(f, "task {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub target: DeleteTarget,
    pub error: String,
}

/// Outcome of one or more delete runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub deleted_groups: Vec<GroupId>,
    pub deleted_tasks: Vec<TaskId>,
    pub failures: Vec<DeleteFailure>,

    /// Groups left in place because something below them was not deleted
    pub blocked: Vec<GroupId>,
}

impl DeleteReport {
    /// Returns true if every planned record was deleted
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.blocked.is_empty()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted_groups.len() + self.deleted_tasks.len()
    }

    pub fn merge(&mut self, other: DeleteReport) {
        self.deleted_groups.extend(other.deleted_groups);
        self.deleted_tasks.extend(other.deleted_tasks);
        self.failures.extend(other.failures);
        self.blocked.extend(other.blocked);
    }

    pub(crate) fn record_task(&mut self, id: TaskId, result: Result<(), StoreError>) -> bool {
        match result {
            Ok(()) => {
                self.deleted_tasks.push(id);
                true
            }
            Err(e) if e.is_not_found() => {
                self.deleted_tasks.push(id);
                true
            }
            Err(e) => {
                self.failures.push(DeleteFailure {
                    target: DeleteTarget::Task { id },
                    error: e.to_string(),
                });
                false
            }
        }
    }

    fn record_group(&mut self, id: GroupId, result: Result<(), StoreError>) -> bool {
        match result {
            Ok(()) => {
                self.deleted_groups.push(id);
                true
            }
            Err(e) if e.is_not_found() => {
                self.deleted_groups.push(id);
                true
            }
            Err(e) => {
                self.failures.push(DeleteFailure {
                    target: DeleteTarget::Group { id },
                    error: e.to_string(),
                });
                false
            }
        }
    }
}

/// Runs every step of `plan`, one store call at a time
pub fn execute<R: Repository + ?Sized>(repo: &mut R, plan: &DeletionPlan) -> DeleteReport {
    let mut report = DeleteReport::default();
    // Groups with something below them still in the store
    let mut incomplete: HashSet<GroupId> = HashSet::new();

    for step in &plan.steps {
        match *step {
            DeleteStep::Task { id, group } => {
                if !report.record_task(id, repo.delete_task(id)) {
                    incomplete.insert(group);
                }
            }
            DeleteStep::Group { id, parent } => {
                let removed = if incomplete.contains(&id) {
                    report.blocked.push(id);
                    false
                } else {
                    report.record_group(id, repo.delete_group(id))
                };

                if !removed {
                    if let Some(parent) = parent {
                        incomplete.insert(parent);
                    }
                }
            }
        }
    }

    report
}
