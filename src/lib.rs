//! Taskboard - project task boards with nested task groups
//!
//! Projects hold a forest of task groups; tasks live inside groups. The
//! [`board`] layer turns a project's flat group and task lists into display
//! rows with expand/collapse state, and runs adds, moves and recursive
//! deletes against a [`storage::Repository`].

pub mod board;
pub mod cli;
pub mod domain;
pub mod storage;

pub use board::Board;
pub use domain::{build_rows, GroupId, Row, Task, TaskGroup, TaskId};
