//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::session::Session;
use super::tree::TreeOptions;
use super::{comment, group, project, task, time_log, tree, tui};
use crate::domain::{GroupId, ProjectId};
use crate::storage::{Config, InitOptions, RecordRepository, Workspace};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(author, version, about = "Project task board with nested task groups")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config's default_format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project to work on instead of the workspace's current one
    #[arg(long, short = 'p', global = true, env = "TASKBOARD_PROJECT")]
    pub project: Option<ProjectId>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace with an organization and a first project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Organization name
        #[arg(long = "org", default_value = "My Organization")]
        organization: String,

        /// Name of the first project
        #[arg(long = "project-name", default_value = "My Project")]
        project_name: String,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(project::ProjectCommands),

    /// Manage task groups
    #[command(subcommand)]
    Group(group::GroupCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Manage task comments
    #[command(subcommand)]
    Comment(comment::CommentCommands),

    /// Manage time logs
    #[command(subcommand)]
    Log(time_log::LogCommands),

    /// Print the project's groups and tasks as a tree
    Tree {
        /// Collapse a group (repeatable)
        #[arg(long)]
        collapse: Vec<GroupId>,

        /// Collapse every group
        #[arg(long, conflicts_with = "expand_all")]
        collapse_all: bool,

        /// Expand every group, ignoring expand_on_load
        #[arg(long)]
        expand_all: bool,
    },

    /// Open the interactive board
    Board,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("Taskboard starting");

    match cli.command {
        Commands::Init {
            path,
            organization,
            project_name,
        } => {
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
            let options = InitOptions {
                organization,
                project: project_name,
            };
            let workspace = Workspace::init(&path, &options)?;
            output.verbose_ctx(
                "init",
                &format!("Database at: {}", workspace.db_path().display()),
            );

            if output.is_json() {
                output.data(&serde_json::json!({
                    "root": workspace.root().display().to_string(),
                    "organization": workspace.config().workspace.organization,
                    "project": workspace.config().workspace.project,
                }));
            } else {
                output.success(&format!(
                    "Initialized taskboard workspace at {}",
                    workspace.root().display()
                ));
            }
        }

        Commands::Project(cmd) => project::run(cmd, &output, cli.project)?,
        Commands::Group(cmd) => group::run(cmd, &output, cli.project)?,
        Commands::Task(cmd) => task::run(cmd, &output, cli.project)?,
        Commands::Comment(cmd) => comment::run(cmd, &output, cli.project)?,
        Commands::Log(cmd) => time_log::run(cmd, &output, cli.project)?,

        Commands::Tree {
            collapse,
            collapse_all,
            expand_all,
        } => {
            let options = TreeOptions {
                collapse,
                collapse_all,
                expand_all,
            };
            tree::run(&output, cli.project, options)?
        }

        Commands::Board => {
            let session = Session::open(cli.project, &output)?;
            let board = session.board()?;
            let project = board.repo().get_project(board.project())?;
            let title = format!("{} {}", project.id.label(), project.name);
            tui::run(&output, board, title)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
