//! # Storage Layer
//!
//! Persistence for Taskboard.
//!
//! ## Workspace Structure
//!
//! ```text
//! .taskboard/
//! ├── config.toml    # Workspace configuration
//! ├── board.db       # SQLite database
//! └── .gitignore     # Ignores SQLite WAL files
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing a taskboard workspace
//! - [`Repository`] - Group and task operations a board issues
//! - [`RecordRepository`] - Organizations, projects and task details
//! - [`SqliteStore`] - SQLite implementation of both contracts
//! - [`Config`] - Workspace and global configuration

mod config;
mod repository;
mod sqlite;
mod workspace;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, WorkspaceConfig, WORKSPACE_DIR};
pub use repository::{RecordRepository, Repository, StoreError};
pub use sqlite::SqliteStore;
pub use workspace::{InitOptions, Workspace, WorkspaceError};
