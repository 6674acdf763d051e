//! Domain models for Taskboard
//!
//! Contains the core board logic without any I/O concerns.

mod activity;
mod expand;
mod group;
mod hierarchy;
mod id;
mod project;
mod task;
mod tree;
mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use activity::{format_duration, Comment, NewComment, NewTimeLog, TimeLog};
pub use expand::ExpandState;
pub use group::{NewGroup, TaskGroup};
pub use hierarchy::{DeleteStep, DeletionPlan, GroupForest, HierarchyError};
pub use id::{CommentId, GroupId, IdError, OrganizationId, ProjectId, TaskId, TimeLogId, UserId};
pub use project::{NewProject, Organization, Project};
pub use task::{normalize_tag, NewTask, Task, TaskPatch};
pub use tree::{build_rows, PendingAdd, Row, RowKey, RowKind};
pub use validation::{validate_name, ValidationError, MAX_NAME_LEN};
