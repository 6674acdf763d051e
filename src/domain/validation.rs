//! Input validation shared by create and update paths
//!
//! Validation runs before any store call. A rejected draft never reaches the
//! repository.

use chrono::NaiveDate;
use thiserror::Error;

/// Longest name accepted for groups, tasks and projects
pub const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    #[error("{kind} name is too long ({len} characters, max {max})")]
    NameTooLong {
        kind: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Start date {start} is after end date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("Estimate must be a non-negative number of hours, got {0}")]
    Estimate(f64),

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Time log ends before it starts")]
    TimeRange,
}

/// Trims a display name and checks it is usable
pub fn validate_name(kind: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName(kind));
    }

    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            kind,
            len,
            max: MAX_NAME_LEN,
        });
    }

    Ok(trimmed.to_string())
}

/// Checks that an optional start date does not fall after an optional end date
pub fn validate_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(ValidationError::DateRange { start, end }),
        _ => Ok(()),
    }
}

/// Checks an estimate in hours
pub fn validate_estimate(estimate: Option<f64>) -> Result<(), ValidationError> {
    match estimate {
        Some(hours) if !hours.is_finite() || hours < 0.0 => Err(ValidationError::Estimate(hours)),
        _ => Ok(()),
    }
}
