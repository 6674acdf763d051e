//! Task domain model
//!
//! Tasks are the units of work on a board. A task usually sits in a group,
//! but the store also allows ungrouped tasks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{GroupId, OrganizationId, ProjectId, TaskId, UserId};
use super::validation::{validate_dates, validate_estimate, validate_name, ValidationError};

/// A task as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    /// Display name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub project_id: ProjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,

    /// Owning group, `None` for an ungrouped task
    pub group_id: Option<GroupId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Estimated effort in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_hours: Option<f64>,

    #[serde(default)]
    pub assignee_ids: Vec<UserId>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Returns true if the task belongs to no group
    pub fn is_ungrouped(&self) -> bool {
        self.group_id.is_none()
    }
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub organization_id: Option<OrganizationId>,
    pub group_id: Option<GroupId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub estimate_hours: Option<f64>,
    pub assignee_ids: Vec<UserId>,
}

impl NewTask {
    /// Starts a creation request with just a name and project
    pub fn named(name: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            name: name.into(),
            description: None,
            project_id,
            organization_id: None,
            group_id: None,
            start_date: None,
            end_date: None,
            estimate_hours: None,
            assignee_ids: Vec::new(),
        }
    }

    /// Sets the target group
    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Checks the request and normalizes the name and description
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = validate_name("Task", &self.name)?;
        self.description = normalize_text(self.description);
        validate_dates(self.start_date, self.end_date)?;
        validate_estimate(self.estimate_hours)?;
        self.assignee_ids.sort();
        self.assignee_ids.dedup();
        Ok(self)
    }
}

/// Partial update of a task's editable fields
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub estimate_hours: Option<Option<f64>>,
}

impl TaskPatch {
    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.estimate_hours.is_none()
    }

    /// Applies the patch to a copy of `task`, validating the result
    pub fn applied_to(&self, task: &Task) -> Result<Task, ValidationError> {
        let mut updated = task.clone();

        if let Some(name) = &self.name {
            updated.name = validate_name("Task", name)?;
        }
        if let Some(description) = &self.description {
            updated.description = normalize_text(description.clone());
        }
        if let Some(start) = self.start_date {
            updated.start_date = start;
        }
        if let Some(end) = self.end_date {
            updated.end_date = end;
        }
        if let Some(estimate) = self.estimate_hours {
            updated.estimate_hours = estimate;
        }

        validate_dates(updated.start_date, updated.end_date)?;
        validate_estimate(updated.estimate_hours)?;

        Ok(updated)
    }
}

/// Normalizes a tag name: trimmed, lowercase, spaces become hyphens
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task() -> Task {
        Task {
            id: TaskId::new(10),
            name: "Design".to_string(),
            description: None,
            project_id: ProjectId::new(1),
            organization_id: None,
            group_id: Some(GroupId::new(1)),
            start_date: None,
            end_date: None,
            estimate_hours: None,
            assignee_ids: vec![],
            tags: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_validation_normalizes() {
        let mut request = NewTask::named("  Write spec ", ProjectId::new(1)).in_group(GroupId::new(2));
        request.description = Some("   ".to_string());
        request.assignee_ids = vec!["bob".parse().unwrap(), "alice".parse().unwrap(), "bob".parse().unwrap()];

        let request = request.validated().unwrap();
        assert_eq!(request.name, "Write spec");
        assert_eq!(request.description, None);
        assert_eq!(request.group_id, Some(GroupId::new(2)));
        assert_eq!(request.assignee_ids.len(), 2);
        assert_eq!(request.assignee_ids[0].as_str(), "alice");
    }

    #[test]
    fn new_task_rejects_empty_name() {
        let result = NewTask::named("", ProjectId::new(1)).validated();
        assert_eq!(result, Err(ValidationError::EmptyName("Task")));
    }

    #[test]
    fn new_task_rejects_inverted_dates() {
        let mut request = NewTask::named("Build", ProjectId::new(1));
        request.start_date = Some(date(2024, 3, 2));
        request.end_date = Some(date(2024, 3, 1));

        assert!(matches!(
            request.validated(),
            Err(ValidationError::DateRange { .. })
        ));
    }

    #[test]
    fn patch_updates_and_clears() {
        let mut task = make_task();
        task.description = Some("old".to_string());

        let patch = TaskPatch {
            name: Some("Design review".to_string()),
            description: Some(None),
            estimate_hours: Some(Some(4.0)),
            ..TaskPatch::default()
        };

        let updated = patch.applied_to(&task).unwrap();
        assert_eq!(updated.name, "Design review");
        assert_eq!(updated.description, None);
        assert_eq!(updated.estimate_hours, Some(4.0));
        assert_eq!(updated.group_id, task.group_id);
    }

    #[test]
    fn patch_checks_combined_dates() {
        let mut task = make_task();
        task.end_date = Some(date(2024, 1, 10));

        let patch = TaskPatch {
            start_date: Some(Some(date(2024, 1, 20))),
            ..TaskPatch::default()
        };

        assert!(patch.applied_to(&task).is_err());
    }

    #[test]
    fn empty_patch() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            end_date: Some(None),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn tag_normalization() {
        assert_eq!(normalize_tag("  Front End "), "front-end");
        assert_eq!(normalize_tag("API"), "api");
        assert_eq!(normalize_tag("   "), "");
    }

    #[test]
    fn ungrouped_task() {
        let mut task = make_task();
        assert!(!task.is_ungrouped());
        task.group_id = None;
        assert!(task.is_ungrouped());
    }
}
