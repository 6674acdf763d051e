//! Organizations and projects
//!
//! An organization owns projects; a project owns the groups and tasks shown
//! on a board. The organization is always passed explicitly to whatever
//! needs it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrganizationId, ProjectId};
use super::validation::{validate_dates, validate_name, ValidationError};

/// An organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A project within an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub organization_id: OrganizationId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub organization_id: OrganizationId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl NewProject {
    /// Builds a validated creation request with no dates
    pub fn new(name: &str, organization_id: OrganizationId) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name("Project", name)?,
            description: None,
            organization_id,
            start_date: None,
            end_date: None,
        })
    }

    /// Sets the planned date range
    pub fn with_dates(
        mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        validate_dates(start_date, end_date)?;
        self.start_date = start_date;
        self.end_date = end_date;
        Ok(self)
    }
}
