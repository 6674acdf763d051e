//! Store contracts
//!
//! [`Repository`] is everything the board needs: listing a project's groups
//! and tasks and mutating them one record at a time. [`RecordRepository`]
//! adds the records the CLI manages around a board (organizations, projects,
//! assignees, tags, comments and time logs).
//!
//! Every call is synchronous and independent. Callers never rely on
//! transactions spanning more than one call.

use thiserror::Error;

use crate::domain::{
    Comment, CommentId, GroupId, HierarchyError, NewComment, NewGroup, NewProject, NewTask,
    NewTimeLog, Organization, OrganizationId, Project, ProjectId, Task, TaskGroup, TaskId,
    TaskPatch, TimeLog, TimeLogId, UserId, ValidationError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("{0}")]
    Constraint(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaVersion { found: i32, supported: i32 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<i64>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true if the record the call targeted does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Group and task operations a board issues
pub trait Repository {
    /// Groups of a project in creation order
    fn list_groups(&self, project: ProjectId) -> Result<Vec<TaskGroup>, StoreError>;

    /// Tasks of a project in creation order
    fn list_tasks(&self, project: ProjectId) -> Result<Vec<Task>, StoreError>;

    fn get_task(&self, id: TaskId) -> Result<Task, StoreError>;

    fn create_group(&mut self, group: &NewGroup) -> Result<TaskGroup, StoreError>;

    fn create_task(&mut self, task: &NewTask) -> Result<Task, StoreError>;

    fn rename_group(&mut self, id: GroupId, name: &str) -> Result<TaskGroup, StoreError>;

    /// Re-parents a group; `None` makes it a root
    fn move_group(&mut self, id: GroupId, parent: Option<GroupId>)
        -> Result<TaskGroup, StoreError>;

    fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<Task, StoreError>;

    /// Moves a task into another group; `None` ungroups it
    fn move_task(&mut self, id: TaskId, group: Option<GroupId>) -> Result<Task, StoreError>;

    /// Deletes one group; fails while it still has child groups or tasks
    fn delete_group(&mut self, id: GroupId) -> Result<(), StoreError>;

    fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError>;
}

/// Records managed alongside a board
pub trait RecordRepository: Repository {
    fn create_organization(&mut self, name: &str) -> Result<Organization, StoreError>;

    fn list_organizations(&self) -> Result<Vec<Organization>, StoreError>;

    fn create_project(&mut self, project: &NewProject) -> Result<Project, StoreError>;

    fn list_projects(&self, organization: OrganizationId) -> Result<Vec<Project>, StoreError>;

    fn get_project(&self, id: ProjectId) -> Result<Project, StoreError>;

    fn assign_user(&mut self, task: TaskId, user: &UserId) -> Result<(), StoreError>;

    fn unassign_user(&mut self, task: TaskId, user: &UserId) -> Result<(), StoreError>;

    /// Attaches a tag by name, creating the tag on first use
    fn add_tag(&mut self, task: TaskId, tag: &str) -> Result<(), StoreError>;

    fn remove_tag(&mut self, task: TaskId, tag: &str) -> Result<(), StoreError>;

    /// Comments on a task, oldest first
    fn list_comments(&self, task: TaskId) -> Result<Vec<Comment>, StoreError>;

    fn create_comment(&mut self, comment: &NewComment) -> Result<Comment, StoreError>;

    fn delete_comment(&mut self, id: CommentId) -> Result<(), StoreError>;

    /// Time logs on a task, by start time
    fn list_time_logs(&self, task: TaskId) -> Result<Vec<TimeLog>, StoreError>;

    fn create_time_log(&mut self, log: &NewTimeLog) -> Result<TimeLog, StoreError>;

    fn delete_time_log(&mut self, id: TimeLogId) -> Result<(), StoreError>;
}
