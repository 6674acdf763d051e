//! In-memory repository for board tests
//!
//! Records every mutating call, enforces the same parent/child constraints
//! as the SQLite store and can be told to fail specific calls.

use std::collections::HashSet;

use chrono::Utc;

use crate::domain::{
    GroupId, HierarchyError, NewGroup, NewTask, ProjectId, Task, TaskGroup, TaskId, TaskPatch,
};
use crate::storage::{Repository, StoreError};

#[derive(Debug, Default)]
pub struct MemoryRepository {
    pub groups: Vec<TaskGroup>,
    pub tasks: Vec<Task>,

    /// Mutating calls in the order they were made
    pub calls: Vec<String>,

    failing_groups: HashSet<GroupId>,
    failing_tasks: HashSet<TaskId>,
    fail_creates: bool,
    fail_lists: bool,
    next_id: i64,
}

impl MemoryRepository {
    pub fn with(groups: Vec<TaskGroup>, tasks: Vec<Task>) -> Self {
        let next_id = groups
            .iter()
            .map(|g| g.id.get())
            .chain(tasks.iter().map(|t| t.id.get()))
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            groups,
            tasks,
            next_id,
            ..Self::default()
        }
    }

    pub fn fail_group(&mut self, id: GroupId) {
        self.failing_groups.insert(id);
    }

    pub fn fail_task(&mut self, id: TaskId) {
        self.failing_tasks.insert(id);
    }

    pub fn fail_creates(&mut self) {
        self.fail_creates = true;
    }

    pub fn fail_lists(&mut self) {
        self.fail_lists = true;
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    fn group_mut(&mut self, id: GroupId) -> Result<&mut TaskGroup, StoreError> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::not_found("Group", id.get()))
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("Task", id.get()))
    }

    fn unavailable(&self) -> StoreError {
        StoreError::Unavailable("connection reset".to_string())
    }
}

impl Repository for MemoryRepository {
    fn list_groups(&self, project: ProjectId) -> Result<Vec<TaskGroup>, StoreError> {
        if self.fail_lists {
            return Err(self.unavailable());
        }
        Ok(self.groups.iter().filter(|g| g.project_id == project).cloned().collect())
    }

    fn list_tasks(&self, project: ProjectId) -> Result<Vec<Task>, StoreError> {
        if self.fail_lists {
            return Err(self.unavailable());
        }
        Ok(self.tasks.iter().filter(|t| t.project_id == project).cloned().collect())
    }

    fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Task", id.get()))
    }

    fn create_group(&mut self, group: &NewGroup) -> Result<TaskGroup, StoreError> {
        self.calls.push(format!("create_group {}", group.name));
        if self.fail_creates {
            return Err(self.unavailable());
        }

        let created = TaskGroup {
            id: GroupId::new(self.next_id()),
            name: group.name.clone(),
            parent_id: group.parent_id,
            project_id: group.project_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.groups.push(created.clone());
        Ok(created)
    }

    fn create_task(&mut self, task: &NewTask) -> Result<Task, StoreError> {
        self.calls.push(format!("create_task {}", task.name));
        if self.fail_creates {
            return Err(self.unavailable());
        }

        let created = Task {
            id: TaskId::new(self.next_id()),
            name: task.name.clone(),
            description: task.description.clone(),
            project_id: task.project_id,
            organization_id: task.organization_id,
            group_id: task.group_id,
            start_date: task.start_date,
            end_date: task.end_date,
            estimate_hours: task.estimate_hours,
            assignee_ids: task.assignee_ids.clone(),
            tags: vec![],
            created_at: Utc::now(),
            updated_at: None,
        };
        self.tasks.push(created.clone());
        Ok(created)
    }

    fn rename_group(&mut self, id: GroupId, name: &str) -> Result<TaskGroup, StoreError> {
        self.calls.push(format!("rename_group {}", id));
        let group = self.group_mut(id)?;
        group.name = name.to_string();
        Ok(group.clone())
    }

    fn move_group(
        &mut self,
        id: GroupId,
        parent: Option<GroupId>,
    ) -> Result<TaskGroup, StoreError> {
        self.calls.push(format!("move_group {}", id));
        if parent == Some(id) {
            return Err(HierarchyError::SelfParent(id).into());
        }
        let group = self.group_mut(id)?;
        group.parent_id = parent;
        Ok(group.clone())
    }

    fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        self.calls.push(format!("update_task {}", id));
        let task = self.task_mut(id)?;
        *task = patch.applied_to(task)?;
        Ok(task.clone())
    }

    fn move_task(&mut self, id: TaskId, group: Option<GroupId>) -> Result<Task, StoreError> {
        self.calls.push(format!("move_task {}", id));
        let task = self.task_mut(id)?;
        task.group_id = group;
        Ok(task.clone())
    }

    fn delete_group(&mut self, id: GroupId) -> Result<(), StoreError> {
        self.calls.push(format!("delete_group {}", id));
        if self.failing_groups.contains(&id) {
            return Err(self.unavailable());
        }
        if self.groups.iter().any(|g| g.parent_id == Some(id))
            || self.tasks.iter().any(|t| t.group_id == Some(id))
        {
            return Err(StoreError::Constraint(format!(
                "Group {} still has child groups or tasks",
                id
            )));
        }

        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        if self.groups.len() == before {
            return Err(StoreError::not_found("Group", id.get()));
        }
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.calls.push(format!("delete_task {}", id));
        if self.failing_tasks.contains(&id) {
            return Err(self.unavailable());
        }

        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(StoreError::not_found("Task", id.get()));
        }
        Ok(())
    }
}
