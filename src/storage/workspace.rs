//! Workspace management
//!
//! A workspace is a directory holding `.taskboard/` with the configuration
//! and the SQLite database. Initialization seeds an organization and a
//! default project so a fresh workspace can show a board right away.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, WORKSPACE_DIR};
use super::repository::RecordRepository;
use super::sqlite::SqliteStore;
use crate::domain::NewProject;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a taskboard workspace. Run 'taskboard init' first.")]
    NotInWorkspace,
}

/// Names used when seeding a new workspace
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub organization: String,
    pub project: String,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            organization: "My Organization".to_string(),
            project: "My Project".to_string(),
        }
    }
}

/// An opened workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(WORKSPACE_DIR).is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a workspace at the given path
    ///
    /// Re-running on an initialized workspace keeps its data and only seeds
    /// what is missing.
    pub fn init(root: impl Into<PathBuf>, options: &InitOptions) -> Result<Self> {
        let root = root.into();
        let dir = root.join(WORKSPACE_DIR);

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create workspace directory: {}", dir.display()))?;

        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# SQLite write-ahead log files\nboard.db-wal\nboard.db-shm\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let mut workspace = Self::open(root)?;
        let mut store = workspace.store()?;

        if workspace.config.workspace.organization.is_none() {
            let organization = store
                .create_organization(&options.organization)
                .context("Failed to create organization")?;
            workspace.config.workspace.organization = Some(organization.id);
        }

        if workspace.config.workspace.project.is_none() {
            let organization = workspace.config.workspace.require_organization()?;
            let request = NewProject::new(&options.project, organization)?;
            let project = store
                .create_project(&request)
                .context("Failed to create project")?;
            workspace.config.workspace.project = Some(project.id);
        }

        workspace.config.save_workspace()?;

        Ok(workspace)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .taskboard directory path
    pub fn dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Returns the database path
    pub fn db_path(&self) -> PathBuf {
        self.dir().join(&self.config.workspace.database)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Opens the SQLite store for this workspace
    pub fn store(&self) -> Result<SqliteStore> {
        let path = self.db_path();
        SqliteStore::open(&path)
            .with_context(|| format!("Failed to open database: {}", path.display()))
    }
}
