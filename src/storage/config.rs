//! Configuration handling for Taskboard
//!
//! Configuration is stored in `.taskboard/config.toml` (workspace) and
//! `~/.config/taskboard/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OrganizationId, ProjectId};

/// Name of the workspace directory
pub const WORKSPACE_DIR: &str = ".taskboard";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No organization configured. Run 'taskboard init' first.")]
    NoOrganization,

    #[error("No project selected. Use 'taskboard project use <ID>' or pass --project.")]
    NoProject,

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Organization that owns the workspace's projects
    pub organization: Option<OrganizationId>,

    /// Project shown when `--project` is not given
    pub project: Option<ProjectId>,

    /// Database file, relative to the workspace directory
    pub database: PathBuf,

    /// Expand every group when a board loads
    pub expand_on_load: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            database: PathBuf::from("board.db"),
            expand_on_load: true,
        }
    }
}

impl WorkspaceConfig {
    pub fn require_organization(&self) -> Result<OrganizationId, ConfigError> {
        self.organization.ok_or(ConfigError::NoOrganization)
    }

    /// Picks the explicit project, falling back to the configured one
    pub fn resolve_project(&self, explicit: Option<ProjectId>) -> Result<ProjectId, ConfigError> {
        explicit.or(self.project).ok_or(ConfigError::NoProject)
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + workspace)
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub global: GlobalConfig,
    pub workspace_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (workspace, workspace_root) = match Self::find_workspace_root() {
            Some(root) => (Self::load_workspace_config(&root)?, Some(root)),
            None => (WorkspaceConfig::default(), None),
        };

        Ok(Self {
            workspace,
            global,
            workspace_root,
        })
    }

    /// Loads configuration for a specific workspace
    pub fn for_workspace(root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let workspace = Self::load_workspace_config(root)?;

        Ok(Self {
            workspace,
            global,
            workspace_root: Some(root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskboard", "taskboard")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, or the defaults if there is none
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads workspace configuration from a specific root
    fn load_workspace_config(root: &Path) -> Result<WorkspaceConfig> {
        let config_path = Self::workspace_config_path(root);

        if !config_path.exists() {
            return Ok(WorkspaceConfig::default());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read workspace config: {}", config_path.display())
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse workspace config")
    }

    fn workspace_config_path(root: &Path) -> PathBuf {
        root.join(WORKSPACE_DIR).join("config.toml")
    }

    /// Finds the workspace root by looking for a `.taskboard/` directory
    pub fn find_workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_workspace_root_from(&current)
    }

    /// Walks up from `start` looking for a `.taskboard/` directory
    pub fn find_workspace_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the workspace root, or an error if not in a workspace
    pub fn require_workspace_root(&self) -> Result<&Path> {
        self.workspace_root.as_deref().ok_or_else(|| {
            anyhow::anyhow!("Not in a taskboard workspace. Run 'taskboard init' first.")
        })
    }

    /// Saves the workspace configuration
    pub fn save_workspace(&self) -> Result<()> {
        let root = self.require_workspace_root()?;
        let config_path = Self::workspace_config_path(root);

        let content = toml::to_string_pretty(&self.workspace)
            .context("Failed to serialize workspace config")?;

        fs::write(&config_path, content).with_context(|| {
            format!("Failed to write workspace config: {}", config_path.display())
        })
    }
}
