//! Task group domain model
//!
//! Groups are named containers for tasks within a project. A group may sit
//! under another group, so the groups of a project form a forest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{GroupId, ProjectId};
use super::validation::{validate_name, ValidationError};

/// A task group as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGroup {
    pub id: GroupId,

    /// Display name
    pub name: String,

    /// Parent group, `None` for a root group
    pub parent_id: Option<GroupId>,

    /// Owning project
    pub project_id: ProjectId,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskGroup {
    /// Returns true if this group sits at the root of the forest
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub project_id: ProjectId,
    pub parent_id: Option<GroupId>,
}

impl NewGroup {
    /// Builds a validated creation request
    pub fn new(
        name: &str,
        project_id: ProjectId,
        parent_id: Option<GroupId>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name("Group", name)?,
            project_id,
            parent_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_group_trims_name() {
        let group = NewGroup::new("  Phase 1 ", ProjectId::new(1), None).unwrap();
        assert_eq!(group.name, "Phase 1");
        assert_eq!(group.parent_id, None);
    }

    #[test]
    fn new_group_rejects_blank_name() {
        let result = NewGroup::new("", ProjectId::new(1), Some(GroupId::new(3)));
        assert_eq!(result, Err(ValidationError::EmptyName("Group")));
    }

    #[test]
    fn root_detection() {
        let group = TaskGroup {
            id: GroupId::new(1),
            name: "Root".to_string(),
            parent_id: None,
            project_id: ProjectId::new(1),
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(group.is_root());

        let child = TaskGroup {
            parent_id: Some(GroupId::new(1)),
            ..group
        };
        assert!(!child.is_root());
    }
}
