//! Builders shared by domain and board tests

use chrono::Utc;

use super::group::TaskGroup;
use super::id::{GroupId, ProjectId, TaskId};
use super::task::Task;

pub fn group(id: i64, parent: Option<i64>) -> TaskGroup {
    TaskGroup {
        id: GroupId::new(id),
        name: format!("Group {}", id),
        parent_id: parent.map(GroupId::new),
        project_id: ProjectId::new(1),
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn task(id: i64, group: Option<i64>) -> Task {
    Task {
        id: TaskId::new(id),
        name: format!("Task {}", id),
        description: None,
        project_id: ProjectId::new(1),
        organization_id: None,
        group_id: group.map(GroupId::new),
        start_date: None,
        end_date: None,
        estimate_hours: None,
        assignee_ids: vec![],
        tags: vec![],
        created_at: Utc::now(),
        updated_at: None,
    }
}
