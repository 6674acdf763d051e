//! Input collected for the pending add

use chrono::NaiveDate;

use crate::domain::{validate_name, GroupId, NewGroup, NewTask, ProjectId, UserId, ValidationError};

/// Fields typed into an add row
///
/// Groups only use the name. Tasks use everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub estimate_hours: Option<f64>,
    pub assignees: Vec<UserId>,
}

impl Draft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true once the name would pass validation
    pub fn can_save(&self) -> bool {
        validate_name("", &self.name).is_ok()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_new_group(
        &self,
        project: ProjectId,
        parent: Option<GroupId>,
    ) -> Result<NewGroup, ValidationError> {
        NewGroup::new(&self.name, project, parent)
    }

    pub fn to_new_task(
        &self,
        project: ProjectId,
        group: GroupId,
    ) -> Result<NewTask, ValidationError> {
        let mut task = NewTask::named(validate_name("Task", &self.name)?, project).in_group(group);
        task.description = self.description.clone();
        task.start_date = self.start_date;
        task.end_date = self.end_date;
        task.estimate_hours = self.estimate_hours;
        task.assignee_ids = self.assignees.clone();

        task.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_NAME_LEN;

    #[test]
    fn blank_name_cannot_be_saved() {
        assert!(!Draft::default().can_save());
        assert!(!Draft::named("   ").can_save());
        assert!(Draft::named("Design").can_save());
    }

    #[test]
    fn overlong_name_cannot_be_saved() {
        assert!(!Draft::named("x".repeat(MAX_NAME_LEN + 1)).can_save());
        assert!(Draft::named("x".repeat(MAX_NAME_LEN)).can_save());
    }

    #[test]
    fn task_request_targets_group() {
        let mut draft = Draft::named(" Design ");
        draft.estimate_hours = Some(3.0);
        draft.assignees = vec!["alice".parse().unwrap()];

        let request = draft.to_new_task(ProjectId::new(1), GroupId::new(4)).unwrap();
        assert_eq!(request.name, "Design");
        assert_eq!(request.group_id, Some(GroupId::new(4)));
        assert_eq!(request.estimate_hours, Some(3.0));
        assert_eq!(request.assignee_ids.len(), 1);
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let mut draft = Draft::named("Build");
        draft.start_date = NaiveDate::from_ymd_opt(2024, 5, 2);
        draft.end_date = NaiveDate::from_ymd_opt(2024, 5, 1);

        assert!(matches!(
            draft.to_new_task(ProjectId::new(1), GroupId::new(1)),
            Err(ValidationError::DateRange { .. })
        ));
    }

    #[test]
    fn group_request_uses_name_only() {
        let draft = Draft::named("Phase 2");
        let request = draft
            .to_new_group(ProjectId::new(1), Some(GroupId::new(3)))
            .unwrap();

        assert_eq!(request.name, "Phase 2");
        assert_eq!(request.parent_id, Some(GroupId::new(3)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut draft = Draft::named("x");
        draft.estimate_hours = Some(1.0);
        draft.clear();
        assert_eq!(draft, Draft::default());
    }
}
