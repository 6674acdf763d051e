//! SQLite store
//!
//! The database sits in `.taskboard/board.db`. Foreign keys are enforced:
//! a group cannot be deleted while it still has child groups or tasks, so
//! callers must remove a subtree bottom-up. Records owned by a task
//! (assignees, tags, comments and time logs) go with it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use super::repository::{RecordRepository, Repository, StoreError};
use crate::domain::{
    normalize_tag, validate_name, Comment, CommentId, GroupId, HierarchyError, NewComment,
    NewGroup, NewProject, NewTask, NewTimeLog, Organization, OrganizationId, Project, ProjectId,
    Task, TaskGroup, TaskId, TaskPatch, TimeLog, TimeLogId, UserId,
};

const GROUP_COLUMNS: &str = "id, name, parent_id, project_id, created_at, updated_at";

const TASK_COLUMNS: &str = "id, name, description, project_id, organization_id, group_id, \
     start_date, end_date, estimate_hours, created_at, updated_at";

const PROJECT_COLUMNS: &str =
    "id, name, description, organization_id, start_date, end_date, created_at";

/// SQLite-backed repository
pub struct SqliteStore {
    /// Path to the database, `None` when in memory
    db_path: Option<PathBuf>,

    conn: Connection,
}

impl SqliteStore {
    /// Schema version - bump when the schema changes
    pub const SCHEMA_VERSION: i32 = 1;

    /// Opens or creates the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Opens a throwaway database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let mut store = Self { db_path, conn };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Returns the database path, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Gets the current schema version
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let version: Option<i32> = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    /// Creates the schema on a fresh database
    fn ensure_schema(&mut self) -> Result<(), StoreError> {
        let found = self.schema_version()?;

        if found > Self::SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found,
                supported: Self::SCHEMA_VERSION,
            });
        }

        if found == 0 {
            self.create_schema()?;
        }

        Ok(())
    }

    fn create_schema(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            "
            CREATE TABLE organizations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                organization_id INTEGER NOT NULL REFERENCES organizations(id),
                start_date TEXT,
                end_date TEXT,
                created_at TEXT NOT NULL
            );

            -- No cascades: a subtree is removed bottom-up by the caller
            CREATE TABLE task_groups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                parent_id INTEGER REFERENCES task_groups(id),
                project_id INTEGER NOT NULL REFERENCES projects(id),
                created_at TEXT NOT NULL,
                updated_at TEXT
            );

            CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                project_id INTEGER NOT NULL REFERENCES projects(id),
                organization_id INTEGER REFERENCES organizations(id),
                group_id INTEGER REFERENCES task_groups(id),
                start_date TEXT,
                end_date TEXT,
                estimate_hours REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );

            CREATE TABLE task_users (
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                PRIMARY KEY (task_id, user_id)
            );

            CREATE TABLE tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE task_tags (
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (task_id, tag_id)
            );

            CREATE TABLE comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE time_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                description TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX idx_projects_org ON projects(organization_id);
            CREATE INDEX idx_groups_project ON task_groups(project_id);
            CREATE INDEX idx_groups_parent ON task_groups(parent_id);
            CREATE INDEX idx_tasks_project ON tasks(project_id);
            CREATE INDEX idx_tasks_group ON tasks(group_id);
            CREATE INDEX idx_comments_task ON comments(task_id);
            CREATE INDEX idx_time_logs_task ON time_logs(task_id);
            ",
        )?;

        tx.execute_batch(&format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION))?;
        tx.commit()?;

        Ok(())
    }

    fn get_group(&self, id: GroupId) -> Result<TaskGroup, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM task_groups WHERE id = ?1", GROUP_COLUMNS),
                params![id.get()],
                group_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Group", id.get()))
    }

    /// Checks that a group exists and belongs to `project`
    fn require_group_in(&self, id: GroupId, project: ProjectId) -> Result<(), StoreError> {
        let group = self.get_group(id)?;
        if group.project_id != project {
            return Err(StoreError::Constraint(format!(
                "Group {} belongs to project {}, not {}",
                id, group.project_id, project
            )));
        }
        Ok(())
    }

    fn require_task(&self, id: TaskId) -> Result<(), StoreError> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM tasks WHERE id = ?1", params![id.get()], |_| Ok(()))
            .optional()?;
        found.ok_or_else(|| StoreError::not_found("Task", id.get()))
    }

    /// Returns true if `ancestor` is `group` or sits above it
    fn is_ancestor_or_self(&self, ancestor: GroupId, group: GroupId) -> Result<bool, StoreError> {
        // UNION drops repeated rows, so a corrupted cycle still terminates
        let found = self
            .conn
            .query_row(
                "WITH RECURSIVE chain(id) AS (
                     SELECT ?1
                     UNION
                     SELECT g.parent_id FROM task_groups g
                     JOIN chain ON g.id = chain.id
                     WHERE g.parent_id IS NOT NULL
                 )
                 SELECT 1 FROM chain WHERE id = ?2",
                params![group.get(), ancestor.get()],
                |_| Ok(()),
            )
            .optional()?;

        Ok(found.is_some())
    }

    /// Loads tasks matching `filter = key`, with assignees and tags
    fn load_tasks(&self, filter: &str, key: i64) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks t WHERE {} = ?1 ORDER BY id",
            TASK_COLUMNS, filter
        ))?;
        let mut tasks = stmt
            .query_map(params![key], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        if tasks.is_empty() {
            return Ok(tasks);
        }

        let mut assignees: HashMap<TaskId, Vec<UserId>> = HashMap::new();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT tu.task_id, tu.user_id FROM task_users tu
             JOIN tasks t ON t.id = tu.task_id
             WHERE {} = ?1 ORDER BY tu.user_id",
            filter
        ))?;
        let rows = stmt.query_map(params![key], |row| {
            Ok((
                TaskId::new(row.get(0)?),
                UserId::from_stored(row.get(1)?),
            ))
        })?;
        for row in rows {
            let (task_id, user) = row?;
            assignees.entry(task_id).or_default().push(user);
        }

        let mut tags: HashMap<TaskId, Vec<String>> = HashMap::new();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT tt.task_id, tg.name FROM task_tags tt
             JOIN tags tg ON tg.id = tt.tag_id
             JOIN tasks t ON t.id = tt.task_id
             WHERE {} = ?1 ORDER BY tg.name",
            filter
        ))?;
        let rows = stmt.query_map(params![key], |row| {
            Ok((TaskId::new(row.get(0)?), row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (task_id, tag) = row?;
            tags.entry(task_id).or_default().push(tag);
        }

        for task in &mut tasks {
            task.assignee_ids = assignees.remove(&task.id).unwrap_or_default();
            task.tags = tags.remove(&task.id).unwrap_or_default();
        }

        Ok(tasks)
    }
}

impl Repository for SqliteStore {
    fn list_groups(&self, project: ProjectId) -> Result<Vec<TaskGroup>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM task_groups WHERE project_id = ?1 ORDER BY id",
            GROUP_COLUMNS
        ))?;
        let groups = stmt
            .query_map(params![project.get()], group_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(groups)
    }

    fn list_tasks(&self, project: ProjectId) -> Result<Vec<Task>, StoreError> {
        self.load_tasks("t.project_id", project.get())
    }

    fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.load_tasks("t.id", id.get())?
            .pop()
            .ok_or_else(|| StoreError::not_found("Task", id.get()))
    }

    fn create_group(&mut self, group: &NewGroup) -> Result<TaskGroup, StoreError> {
        let name = validate_name("Group", &group.name)?;
        self.get_project(group.project_id)?;
        if let Some(parent) = group.parent_id {
            self.require_group_in(parent, group.project_id)?;
        }

        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO task_groups (name, parent_id, project_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                name,
                group.parent_id.map(GroupId::get),
                group.project_id.get(),
                now
            ],
        )?;

        self.get_group(GroupId::new(self.conn.last_insert_rowid()))
    }

    fn create_task(&mut self, task: &NewTask) -> Result<Task, StoreError> {
        let task = task.clone().validated()?;
        let project = self.get_project(task.project_id)?;
        if let Some(group) = task.group_id {
            self.require_group_in(group, task.project_id)?;
        }
        let organization = task.organization_id.unwrap_or(project.organization_id);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO tasks (name, description, project_id, organization_id, group_id,
                                start_date, end_date, estimate_hours, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.name,
                task.description,
                task.project_id.get(),
                organization.get(),
                task.group_id.map(GroupId::get),
                task.start_date,
                task.end_date,
                task.estimate_hours,
                Utc::now(),
            ],
        )?;
        let id = TaskId::new(tx.last_insert_rowid());

        for user in &task.assignee_ids {
            tx.execute(
                "INSERT OR IGNORE INTO task_users (task_id, user_id) VALUES (?1, ?2)",
                params![id.get(), user.as_str()],
            )?;
        }
        tx.commit()?;

        self.get_task(id)
    }

    fn rename_group(&mut self, id: GroupId, name: &str) -> Result<TaskGroup, StoreError> {
        let name = validate_name("Group", name)?;

        let updated = self.conn.execute(
            "UPDATE task_groups SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, Utc::now(), id.get()],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("Group", id.get()));
        }

        self.get_group(id)
    }

    fn move_group(
        &mut self,
        id: GroupId,
        parent: Option<GroupId>,
    ) -> Result<TaskGroup, StoreError> {
        let group = self.get_group(id)?;

        if let Some(parent) = parent {
            if parent == id {
                return Err(HierarchyError::SelfParent(id).into());
            }
            self.require_group_in(parent, group.project_id)?;
            if self.is_ancestor_or_self(id, parent)? {
                return Err(HierarchyError::CycleDetected { group: id, parent }.into());
            }
        }

        self.conn.execute(
            "UPDATE task_groups SET parent_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![parent.map(GroupId::get), Utc::now(), id.get()],
        )?;

        self.get_group(id)
    }

    fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let current = self.get_task(id)?;
        if patch.is_empty() {
            return Ok(current);
        }
        let task = patch.applied_to(&current)?;

        self.conn.execute(
            "UPDATE tasks SET name = ?1, description = ?2, start_date = ?3, end_date = ?4,
                              estimate_hours = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                task.name,
                task.description,
                task.start_date,
                task.end_date,
                task.estimate_hours,
                Utc::now(),
                id.get()
            ],
        )?;

        self.get_task(id)
    }

    fn move_task(&mut self, id: TaskId, group: Option<GroupId>) -> Result<Task, StoreError> {
        let task = self.get_task(id)?;
        if let Some(group) = group {
            self.require_group_in(group, task.project_id)?;
        }

        self.conn.execute(
            "UPDATE tasks SET group_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![group.map(GroupId::get), Utc::now(), id.get()],
        )?;

        self.get_task(id)
    }

    fn delete_group(&mut self, id: GroupId) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM task_groups WHERE id = ?1", params![id.get()])
            .map_err(|e| {
                if is_constraint(&e) {
                    StoreError::Constraint(format!(
                        "Group {} still has child groups or tasks",
                        id
                    ))
                } else {
                    e.into()
                }
            })?;

        if deleted == 0 {
            return Err(StoreError::not_found("Group", id.get()));
        }
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.get()])?;

        if deleted == 0 {
            return Err(StoreError::not_found("Task", id.get()));
        }
        Ok(())
    }
}

impl RecordRepository for SqliteStore {
    fn create_organization(&mut self, name: &str) -> Result<Organization, StoreError> {
        let name = validate_name("Organization", name)?;
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO organizations (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;

        Ok(Organization {
            id: OrganizationId::new(self.conn.last_insert_rowid()),
            name,
            created_at: now,
        })
    }

    fn list_organizations(&self) -> Result<Vec<Organization>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM organizations ORDER BY id")?;
        let organizations = stmt
            .query_map([], |row| {
                Ok(Organization {
                    id: OrganizationId::new(row.get(0)?),
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(organizations)
    }

    fn create_project(&mut self, project: &NewProject) -> Result<Project, StoreError> {
        let name = validate_name("Project", &project.name)?;
        let organization = self
            .conn
            .query_row(
                "SELECT 1 FROM organizations WHERE id = ?1",
                params![project.organization_id.get()],
                |_| Ok(()),
            )
            .optional()?;
        if organization.is_none() {
            return Err(StoreError::not_found(
                "Organization",
                project.organization_id.get(),
            ));
        }

        self.conn.execute(
            "INSERT INTO projects (name, description, organization_id, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                project.description,
                project.organization_id.get(),
                project.start_date,
                project.end_date,
                Utc::now()
            ],
        )?;

        self.get_project(ProjectId::new(self.conn.last_insert_rowid()))
    }

    fn list_projects(&self, organization: OrganizationId) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM projects WHERE organization_id = ?1 ORDER BY id",
            PROJECT_COLUMNS
        ))?;
        let projects = stmt
            .query_map(params![organization.get()], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    fn get_project(&self, id: ProjectId) -> Result<Project, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
                params![id.get()],
                project_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Project", id.get()))
    }

    fn assign_user(&mut self, task: TaskId, user: &UserId) -> Result<(), StoreError> {
        self.require_task(task)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO task_users (task_id, user_id) VALUES (?1, ?2)",
            params![task.get(), user.as_str()],
        )?;
        Ok(())
    }

    fn unassign_user(&mut self, task: TaskId, user: &UserId) -> Result<(), StoreError> {
        self.require_task(task)?;
        self.conn.execute(
            "DELETE FROM task_users WHERE task_id = ?1 AND user_id = ?2",
            params![task.get(), user.as_str()],
        )?;
        Ok(())
    }

    fn add_tag(&mut self, task: TaskId, tag: &str) -> Result<(), StoreError> {
        let name = validate_name("Tag", &normalize_tag(tag))?;
        self.require_task(task)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
            params![name],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO task_tags (task_id, tag_id)
             SELECT ?1, id FROM tags WHERE name = ?2",
            params![task.get(), name],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn remove_tag(&mut self, task: TaskId, tag: &str) -> Result<(), StoreError> {
        self.require_task(task)?;
        self.conn.execute(
            "DELETE FROM task_tags
             WHERE task_id = ?1 AND tag_id IN (SELECT id FROM tags WHERE name = ?2)",
            params![task.get(), normalize_tag(tag)],
        )?;
        Ok(())
    }

    fn list_comments(&self, task: TaskId) -> Result<Vec<Comment>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, user_id, content, created_at FROM comments
             WHERE task_id = ?1 ORDER BY created_at, id",
        )?;
        let comments = stmt
            .query_map(params![task.get()], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    fn create_comment(&mut self, comment: &NewComment) -> Result<Comment, StoreError> {
        self.require_task(comment.task_id)?;
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO comments (task_id, user_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                comment.task_id.get(),
                comment.user_id.as_str(),
                comment.content,
                now
            ],
        )?;

        Ok(Comment {
            id: CommentId::new(self.conn.last_insert_rowid()),
            task_id: comment.task_id,
            user_id: comment.user_id.clone(),
            content: comment.content.clone(),
            created_at: now,
        })
    }

    fn delete_comment(&mut self, id: CommentId) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1", params![id.get()])?;

        if deleted == 0 {
            return Err(StoreError::not_found("Comment", id.get()));
        }
        Ok(())
    }

    fn list_time_logs(&self, task: TaskId) -> Result<Vec<TimeLog>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, user_id, description, start_time, end_time, created_at
             FROM time_logs WHERE task_id = ?1 ORDER BY start_time, id",
        )?;
        let logs = stmt
            .query_map(params![task.get()], time_log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    fn create_time_log(&mut self, log: &NewTimeLog) -> Result<TimeLog, StoreError> {
        self.require_task(log.task_id)?;
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO time_logs (task_id, user_id, description, start_time, end_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                log.task_id.get(),
                log.user_id.as_str(),
                log.description,
                log.start_time,
                log.end_time,
                now
            ],
        )?;

        Ok(TimeLog {
            id: TimeLogId::new(self.conn.last_insert_rowid()),
            task_id: log.task_id,
            user_id: log.user_id.clone(),
            description: log.description.clone(),
            start_time: log.start_time,
            end_time: log.end_time,
            created_at: now,
        })
    }

    fn delete_time_log(&mut self, id: TimeLogId) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM time_logs WHERE id = ?1", params![id.get()])?;

        if deleted == 0 {
            return Err(StoreError::not_found("Time log", id.get()));
        }
        Ok(())
    }
}

fn is_constraint(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<TaskGroup> {
    Ok(TaskGroup {
        id: GroupId::new(row.get(0)?),
        name: row.get(1)?,
        parent_id: row.get::<_, Option<i64>>(2)?.map(GroupId::new),
        project_id: ProjectId::new(row.get(3)?),
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        project_id: ProjectId::new(row.get(3)?),
        organization_id: row.get::<_, Option<i64>>(4)?.map(OrganizationId::new),
        group_id: row.get::<_, Option<i64>>(5)?.map(GroupId::new),
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        estimate_hours: row.get(8)?,
        assignee_ids: Vec::new(),
        tags: Vec::new(),
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        organization_id: OrganizationId::new(row.get(3)?),
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId::new(row.get(0)?),
        task_id: TaskId::new(row.get(1)?),
        user_id: UserId::from_stored(row.get(2)?),
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn time_log_from_row(row: &Row<'_>) -> rusqlite::Result<TimeLog> {
    Ok(TimeLog {
        id: TimeLogId::new(row.get(0)?),
        task_id: TaskId::new(row.get(1)?),
        user_id: UserId::from_stored(row.get(2)?),
        description: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn setup() -> (SqliteStore, ProjectId) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let org = store.create_organization("Acme").unwrap();
        let project = store
            .create_project(&NewProject::new("Website", org.id).unwrap())
            .unwrap();
        (store, project.id)
    }

    fn add_group(
        store: &mut SqliteStore,
        project: ProjectId,
        name: &str,
        parent: Option<GroupId>,
    ) -> TaskGroup {
        store
            .create_group(&NewGroup::new(name, project, parent).unwrap())
            .unwrap()
    }

    fn add_task(store: &mut SqliteStore, project: ProjectId, name: &str, group: GroupId) -> Task {
        store
            .create_task(&NewTask::named(name, project).in_group(group))
            .unwrap()
    }

    #[test]
    fn open_creates_schema_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.db");

        let store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.schema_version().unwrap(), SqliteStore::SCHEMA_VERSION);

        drop(store);
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.schema_version().unwrap(), SqliteStore::SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        drop(conn);

        assert!(matches!(
            SqliteStore::open(&path),
            Err(StoreError::SchemaVersion { found: 99, .. })
        ));
    }

    #[test]
    fn groups_and_tasks_in_creation_order() {
        let (mut store, project) = setup();
        let a = add_group(&mut store, project, "A", None);
        let b = add_group(&mut store, project, "B", Some(a.id));
        let t1 = add_task(&mut store, project, "t1", b.id);
        let t2 = add_task(&mut store, project, "t2", a.id);

        let groups = store.list_groups(project).unwrap();
        assert_eq!(groups.iter().map(|g| g.id).collect::<Vec<_>>(), vec![a.id, b.id]);
        assert_eq!(groups[1].parent_id, Some(a.id));

        let tasks = store.list_tasks(project).unwrap();
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![t1.id, t2.id]);
        assert_eq!(tasks[0].group_id, Some(b.id));
    }

    #[test]
    fn created_task_keeps_group_and_fields() {
        let (mut store, project) = setup();
        let group = add_group(&mut store, project, "Phase 1", None);

        let mut request = NewTask::named("Design", project).in_group(group.id);
        request.description = Some("Wireframes".to_string());
        request.start_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        request.end_date = NaiveDate::from_ymd_opt(2024, 3, 8);
        request.estimate_hours = Some(6.5);
        request.assignee_ids = vec!["bob".parse().unwrap(), "alice".parse().unwrap()];

        let task = store.create_task(&request).unwrap();
        assert_eq!(task.group_id, Some(group.id));
        assert_eq!(task.description.as_deref(), Some("Wireframes"));
        assert_eq!(task.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(task.estimate_hours, Some(6.5));
        assert_eq!(task.assignee_ids.len(), 2);
        assert_eq!(task.assignee_ids[0].as_str(), "alice");
        assert!(task.organization_id.is_some());
    }

    #[test]
    fn create_rejects_foreign_group() {
        let (mut store, project) = setup();
        let org = store.list_organizations().unwrap()[0].id;
        let other = store
            .create_project(&NewProject::new("Other", org).unwrap())
            .unwrap();
        let group = add_group(&mut store, other.id, "Elsewhere", None);

        let result = store.create_task(&NewTask::named("Misplaced", project).in_group(group.id));
        assert!(matches!(result, Err(StoreError::Constraint(_))));

        let result = store.create_group(&NewGroup::new("Child", project, Some(group.id)).unwrap());
        assert!(matches!(result, Err(StoreError::Constraint(_))));
    }

    #[test]
    fn create_task_validates() {
        let (mut store, project) = setup();
        let result = store.create_task(&NewTask::named("   ", project));
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.list_tasks(project).unwrap().is_empty());
    }

    #[test]
    fn group_with_children_cannot_be_deleted() {
        let (mut store, project) = setup();
        let a = add_group(&mut store, project, "A", None);
        let b = add_group(&mut store, project, "B", Some(a.id));

        assert!(matches!(store.delete_group(a.id), Err(StoreError::Constraint(_))));

        store.delete_group(b.id).unwrap();
        store.delete_group(a.id).unwrap();
        assert!(store.list_groups(project).unwrap().is_empty());
    }

    #[test]
    fn group_with_tasks_cannot_be_deleted() {
        let (mut store, project) = setup();
        let a = add_group(&mut store, project, "A", None);
        let t = add_task(&mut store, project, "t", a.id);

        assert!(matches!(store.delete_group(a.id), Err(StoreError::Constraint(_))));
        store.delete_task(t.id).unwrap();
        store.delete_group(a.id).unwrap();
    }

    #[test]
    fn deleting_missing_records() {
        let (mut store, _) = setup();
        assert!(store.delete_group(GroupId::new(42)).unwrap_err().is_not_found());
        assert!(store.delete_task(TaskId::new(42)).unwrap_err().is_not_found());
        assert!(store.delete_comment(CommentId::new(42)).unwrap_err().is_not_found());
    }

    #[test]
    fn task_delete_cascades_to_owned_records() {
        let (mut store, project) = setup();
        let group = add_group(&mut store, project, "A", None);
        let task = add_task(&mut store, project, "t", group.id);
        let alice: UserId = "alice".parse().unwrap();

        store.assign_user(task.id, &alice).unwrap();
        store.add_tag(task.id, "Backend").unwrap();
        store
            .create_comment(&NewComment::new(task.id, alice.clone(), "hi").unwrap())
            .unwrap();

        store.delete_task(task.id).unwrap();
        assert!(store.list_comments(task.id).unwrap().is_empty());
        store.delete_group(group.id).unwrap();
    }

    #[test]
    fn move_group_rejects_cycles() {
        let (mut store, project) = setup();
        let a = add_group(&mut store, project, "A", None);
        let b = add_group(&mut store, project, "B", Some(a.id));
        let c = add_group(&mut store, project, "C", Some(b.id));

        assert!(matches!(
            store.move_group(a.id, Some(c.id)),
            Err(StoreError::Hierarchy(HierarchyError::CycleDetected { .. }))
        ));
        assert!(matches!(
            store.move_group(a.id, Some(a.id)),
            Err(StoreError::Hierarchy(HierarchyError::SelfParent(_)))
        ));

        let moved = store.move_group(c.id, None).unwrap();
        assert!(moved.is_root());
        let moved = store.move_group(a.id, Some(c.id)).unwrap();
        assert_eq!(moved.parent_id, Some(c.id));
    }

    #[test]
    fn move_task_between_groups() {
        let (mut store, project) = setup();
        let a = add_group(&mut store, project, "A", None);
        let b = add_group(&mut store, project, "B", None);
        let task = add_task(&mut store, project, "t", a.id);

        let moved = store.move_task(task.id, Some(b.id)).unwrap();
        assert_eq!(moved.group_id, Some(b.id));

        let ungrouped = store.move_task(task.id, None).unwrap();
        assert!(ungrouped.is_ungrouped());

        assert!(store.move_task(task.id, Some(GroupId::new(99))).unwrap_err().is_not_found());
    }

    #[test]
    fn rename_and_update() {
        let (mut store, project) = setup();
        let group = add_group(&mut store, project, "Phase 1", None);
        let task = add_task(&mut store, project, "Design", group.id);

        let renamed = store.rename_group(group.id, "  Phase One ").unwrap();
        assert_eq!(renamed.name, "Phase One");
        assert!(renamed.updated_at.is_some());

        let patch = TaskPatch {
            name: Some("Design review".to_string()),
            estimate_hours: Some(Some(2.0)),
            ..TaskPatch::default()
        };
        let updated = store.update_task(task.id, &patch).unwrap();
        assert_eq!(updated.name, "Design review");
        assert_eq!(updated.estimate_hours, Some(2.0));
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn assignees_and_tags() {
        let (mut store, project) = setup();
        let group = add_group(&mut store, project, "A", None);
        let task = add_task(&mut store, project, "t", group.id);
        let alice: UserId = "alice".parse().unwrap();

        store.assign_user(task.id, &alice).unwrap();
        store.assign_user(task.id, &alice).unwrap();
        store.add_tag(task.id, "Front End").unwrap();
        store.add_tag(task.id, "api").unwrap();

        let loaded = store.get_task(task.id).unwrap();
        assert_eq!(loaded.assignee_ids, vec![alice.clone()]);
        assert_eq!(loaded.tags, vec!["api".to_string(), "front-end".to_string()]);

        store.unassign_user(task.id, &alice).unwrap();
        store.remove_tag(task.id, "FRONT END").unwrap();
        let loaded = store.get_task(task.id).unwrap();
        assert!(loaded.assignee_ids.is_empty());
        assert_eq!(loaded.tags, vec!["api".to_string()]);
    }

    #[test]
    fn comments_and_time_logs() {
        let (mut store, project) = setup();
        let group = add_group(&mut store, project, "A", None);
        let task = add_task(&mut store, project, "t", group.id);
        let alice: UserId = "alice".parse().unwrap();

        let comment = store
            .create_comment(&NewComment::new(task.id, alice.clone(), "Started").unwrap())
            .unwrap();
        assert_eq!(store.list_comments(task.id).unwrap(), vec![comment.clone()]);

        let start = Utc::now() - Duration::hours(2);
        let end = Some(start + Duration::minutes(90));
        let log = store
            .create_time_log(&NewTimeLog::new(task.id, alice, start, end).unwrap())
            .unwrap();
        let logs = store.list_time_logs(task.id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].duration(), Some(Duration::minutes(90)));

        store.delete_comment(comment.id).unwrap();
        store.delete_time_log(log.id).unwrap();
        assert!(store.list_comments(task.id).unwrap().is_empty());
        assert!(store.list_time_logs(task.id).unwrap().is_empty());
    }

    #[test]
    fn projects_per_organization() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let acme = store.create_organization("Acme").unwrap();
        let other = store.create_organization("Other").unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        let request = NewProject::new("Website", acme.id)
            .unwrap()
            .with_dates(start, None)
            .unwrap();
        let website = store.create_project(&request).unwrap();
        store
            .create_project(&NewProject::new("Mobile", other.id).unwrap())
            .unwrap();

        let projects = store.list_projects(acme.id).unwrap();
        assert_eq!(projects, vec![website.clone()]);
        assert_eq!(store.get_project(website.id).unwrap().start_date, start);
        assert!(store.get_project(ProjectId::new(99)).unwrap_err().is_not_found());

        let lost = NewProject::new("Lost", OrganizationId::new(99)).unwrap();
        assert!(store.create_project(&lost).unwrap_err().is_not_found());
    }
}
