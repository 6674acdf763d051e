//! Typed identifiers for board entities
//!
//! The store keys every row with an integer primary key. Each entity gets its
//! own newtype so a group id can never be passed where a task id is expected.
//! On the command line ids may be written bare (`12`) or with the entity
//! prefix used in text output (`g12`, `t12`, `p12`).
//!
//! Users are the exception: they are identified by an opaque string coming
//! from the external auth provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid {kind} ID: expected a positive integer (optionally prefixed with '{prefix}'), got '{input}'")]
    Invalid {
        kind: &'static str,
        prefix: &'static str,
        input: String,
    },

    #[error("User ID cannot be empty")]
    EmptyUser,
}

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store key
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw store key
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Returns the prefixed form used in text output
            pub fn label(self) -> String {
                format!("{}{}", $prefix, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let digits = trimmed.strip_prefix($prefix).unwrap_or(trimmed);
                match digits.parse::<i64>() {
                    Ok(raw) if raw > 0 => Ok(Self(raw)),
                    _ => Err(IdError::Invalid {
                        kind: $kind,
                        prefix: $prefix,
                        input: trimmed.to_string(),
                    }),
                }
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

integer_id!(
    /// Organization ID
    OrganizationId, "organization", "o"
);
integer_id!(
    /// Project ID
    ProjectId, "project", "p"
);
integer_id!(
    /// Task group ID
    GroupId, "group", "g"
);
integer_id!(
    /// Task ID
    TaskId, "task", "t"
);
integer_id!(CommentId, "comment", "c");
integer_id!(TimeLogId, "time log", "l");

/// External user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a value already validated by the store
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::EmptyUser);
        }
        Ok(Self(s.to_string()))
    }
}
