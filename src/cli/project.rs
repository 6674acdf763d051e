//! Project CLI commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{NewProject, ProjectId};
use crate::storage::RecordRepository;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project in the workspace's organization
    New {
        /// Project name
        name: String,

        /// Project description
        #[arg(long)]
        desc: Option<String>,

        /// Planned start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Planned end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Make it the current project
        #[arg(long = "use")]
        select: bool,
    },

    /// List the organization's projects
    List,

    /// Set the current project
    Use {
        /// Project ID
        id: ProjectId,
    },
}

pub fn run(cmd: ProjectCommands, output: &Output, project: Option<ProjectId>) -> Result<()> {
    let mut session = Session::open(project, output)?;

    match cmd {
        ProjectCommands::New {
            name,
            desc,
            start,
            end,
            select,
        } => new_project(output, &mut session, &name, desc, start, end, select),
        ProjectCommands::List => list_projects(output, &session),
        ProjectCommands::Use { id } => use_project(output, &mut session, id),
    }
}

fn new_project(
    output: &Output,
    session: &mut Session,
    name: &str,
    desc: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    select: bool,
) -> Result<()> {
    let organization = session.organization()?;
    let mut request = NewProject::new(name, organization)?.with_dates(start, end)?;
    request.description = desc.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

    let mut store = session.store()?;
    let project = store
        .create_project(&request)
        .context("Failed to create project")?;

    if select {
        let workspace = session.workspace_mut();
        workspace.config_mut().workspace.project = Some(project.id);
        workspace.config().save_workspace()?;
    }

    if output.is_json() {
        output.data(&project);
    } else {
        output.success(&format!(
            "Created project {}: {}",
            project.id.label(),
            project.name
        ));
        if select {
            println!("Now using project {}", project.id.label());
        }
    }

    Ok(())
}

fn list_projects(output: &Output, session: &Session) -> Result<()> {
    let organization = session.organization()?;
    let store = session.store()?;
    let projects = store.list_projects(organization)?;
    let current = session.workspace().config().workspace.project;

    if output.is_json() {
        output.data(&projects);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    println!("{:<2} {:<6} {:<30} DATES", "", "ID", "NAME");
    println!("{}", "-".repeat(60));
    for project in &projects {
        let marker = if Some(project.id) == current { "*" } else { "" };
        let dates = match (project.start_date, project.end_date) {
            (None, None) => String::new(),
            (start, end) => format!("{} .. {}", fmt_date(start), fmt_date(end)),
        };
        println!(
            "{:<2} {:<6} {:<30} {}",
            marker,
            project.id.label(),
            project.name,
            dates
        );
    }

    Ok(())
}

fn use_project(output: &Output, session: &mut Session, id: ProjectId) -> Result<()> {
    let store = session.store()?;
    let project = store
        .get_project(id)
        .with_context(|| format!("Failed to load project {}", id.label()))?;

    let organization = session.organization()?;
    if project.organization_id != organization {
        anyhow::bail!(
            "Project {} belongs to another organization",
            project.id.label()
        );
    }

    let workspace = session.workspace_mut();
    workspace.config_mut().workspace.project = Some(project.id);
    workspace.config().save_workspace()?;

    output.success(&format!(
        "Now using project {}: {}",
        project.id.label(),
        project.name
    ));

    Ok(())
}

pub(crate) fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}
