//! Comments and time logs attached to tasks

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CommentId, TaskId, TimeLogId, UserId};
use super::validation::ValidationError;

/// A comment on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub content: String,
}

impl NewComment {
    pub fn new(task_id: TaskId, user_id: UserId, content: &str) -> Result<Self, ValidationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyComment);
        }

        Ok(Self {
            task_id,
            user_id,
            content: content.to_string(),
        })
    }
}

/// Time spent by a user on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: TimeLogId,
    pub task_id: TaskId,
    pub user_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub start_time: DateTime<Utc>,

    /// `None` while the timer is still running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl TimeLog {
    /// Elapsed time, or `None` for a running log
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Input for creating a time log
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeLog {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl NewTimeLog {
    pub fn new(
        task_id: TaskId,
        user_id: UserId,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if end_time.is_some_and(|end| end < start_time) {
            return Err(ValidationError::TimeRange);
        }

        Ok(Self {
            task_id,
            user_id,
            description: None,
            start_time,
            end_time,
        })
    }
}

/// Formats a duration as `1h 05m`
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
