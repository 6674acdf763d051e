//! Workspace access shared by commands

use anyhow::{anyhow, Context, Result};

use super::output::Output;
use crate::board::{Board, BoardError};
use crate::domain::{OrganizationId, Project, ProjectId};
use crate::storage::{RecordRepository, Repository, SqliteStore, Workspace};

/// An opened workspace plus the project a command targets
pub struct Session {
    workspace: Workspace,
    project: Option<ProjectId>,
}

impl Session {
    /// Opens the workspace at the current directory or a parent
    pub fn open(project: Option<ProjectId>, output: &Output) -> Result<Self> {
        let workspace = Workspace::open_current()?;
        output.verbose_ctx(
            "workspace",
            &format!("Using workspace at {}", workspace.root().display()),
        );

        Ok(Self { workspace, project })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn store(&self) -> Result<SqliteStore> {
        self.workspace.store()
    }

    pub fn organization(&self) -> Result<OrganizationId> {
        Ok(self.workspace.config().workspace.require_organization()?)
    }

    /// The `--project` override, or the workspace's current project
    pub fn project_id(&self) -> Result<ProjectId> {
        Ok(self.workspace.config().workspace.resolve_project(self.project)?)
    }

    /// Loads the selected project record
    pub fn project(&self, store: &SqliteStore) -> Result<Project> {
        let id = self.project_id()?;
        store
            .get_project(id)
            .with_context(|| format!("Failed to load project {}", id.label()))
    }

    /// Loads the board for the selected project
    pub fn board(&self) -> Result<Board<SqliteStore>> {
        let store = self.store()?;
        let project = self.project(&store)?;
        let expand = self.workspace.config().workspace.expand_on_load;

        Board::load(store, project.id, expand)
            .with_context(|| format!("Failed to load board for '{}'", project.name))
    }
}

/// Prints a board action's notices and converts its error
///
/// A failed action already explains itself in its last error notice, which
/// becomes the returned error instead of being printed twice.
pub fn settle<T, R: Repository>(
    output: &Output,
    board: &mut Board<R>,
    result: Result<T, BoardError>,
) -> Result<T> {
    let notices = board.take_notices();

    match result {
        Ok(value) => {
            output.notices(&notices);
            Ok(value)
        }
        Err(err) => match notices.iter().rev().find(|n| n.is_error()) {
            Some(notice) => Err(anyhow!(notice.message.clone())),
            None => Err(err.into()),
        },
    }
}
