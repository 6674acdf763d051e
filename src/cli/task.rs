//! Task CLI commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};

use super::output::Output;
use super::project::fmt_date;
use super::session::{settle, Session};
use crate::board::Created;
use crate::domain::{
    format_duration, GroupId, NewTask, ProjectId, Task, TaskId, TaskPatch, UserId,
};
use crate::storage::{RecordRepository, Repository};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   taskboard task add "Design" --group g1
    ///   taskboard task add "Review" --group g2 --estimate 1.5 --assignee alice
    Add {
        /// Task name
        name: String,

        /// Group the task belongs to (ungrouped tasks are not shown on the board)
        #[arg(long)]
        group: Option<GroupId>,

        /// Task description
        #[arg(long)]
        desc: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Estimate in hours
        #[arg(long)]
        estimate: Option<f64>,

        /// Assignee user ID (repeatable)
        #[arg(long = "assignee")]
        assignees: Vec<UserId>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Update task fields
    Update {
        /// Task ID
        id: TaskId,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        desc: Option<String>,

        /// New start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// New end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// New estimate in hours
        #[arg(long)]
        estimate: Option<f64>,

        /// Clear a field (repeatable)
        #[arg(long, value_enum)]
        clear: Vec<ClearField>,
    },

    /// Move a task into a group, or out of every group
    Move {
        /// Task ID
        id: TaskId,

        /// Target group ID (omit to ungroup)
        #[arg(long)]
        group: Option<GroupId>,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,
    },

    /// Assign a user to a task
    Assign {
        /// Task ID
        id: TaskId,

        /// User ID
        user: UserId,
    },

    /// Remove a user from a task
    Unassign {
        /// Task ID
        id: TaskId,

        /// User ID
        user: UserId,
    },

    /// Tag a task
    Tag {
        /// Task ID
        id: TaskId,

        /// Tag name
        tag: String,
    },

    /// Remove a tag from a task
    Untag {
        /// Task ID
        id: TaskId,

        /// Tag name
        tag: String,
    },
}

/// Optional task fields that `task update --clear` can reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClearField {
    Desc,
    Start,
    End,
    Estimate,
}

pub fn run(cmd: TaskCommands, output: &Output, project: Option<ProjectId>) -> Result<()> {
    let session = Session::open(project, output)?;

    match cmd {
        TaskCommands::Add {
            name,
            group,
            desc,
            start,
            end,
            estimate,
            assignees,
        } => {
            let mut request = NewTask::named(name, session.project_id()?);
            request.description = desc;
            request.start_date = start;
            request.end_date = end;
            request.estimate_hours = estimate;
            request.assignee_ids = assignees;

            match group {
                Some(group) => add_to_group(output, &session, request, group),
                None => add_ungrouped(output, &session, request),
            }
        }
        TaskCommands::Show { id } => show_task(output, &session, id),
        TaskCommands::Update {
            id,
            name,
            desc,
            start,
            end,
            estimate,
            clear,
        } => {
            let mut patch = TaskPatch {
                name,
                description: desc.map(Some),
                start_date: start.map(Some),
                end_date: end.map(Some),
                estimate_hours: estimate.map(Some),
            };
            for field in clear {
                match field {
                    ClearField::Desc => patch.description = Some(None),
                    ClearField::Start => patch.start_date = Some(None),
                    ClearField::End => patch.end_date = Some(None),
                    ClearField::Estimate => patch.estimate_hours = Some(None),
                }
            }
            update_task(output, &session, id, &patch)
        }
        TaskCommands::Move { id, group } => move_task(output, &session, id, group),
        TaskCommands::Delete { id } => {
            let mut board = session.board()?;
            let deleted = board.delete_task(id);
            settle(output, &mut board, deleted)?;
            if output.is_json() {
                output.data(&serde_json::json!({ "deleted": id }));
            }
            Ok(())
        }
        TaskCommands::Assign { id, user } => {
            let mut store = session.store()?;
            store.assign_user(id, &user)?;
            output.success(&format!("Assigned {} to task {}", user, id.label()));
            Ok(())
        }
        TaskCommands::Unassign { id, user } => {
            let mut store = session.store()?;
            store.unassign_user(id, &user)?;
            output.success(&format!("Unassigned {} from task {}", user, id.label()));
            Ok(())
        }
        TaskCommands::Tag { id, tag } => {
            let mut store = session.store()?;
            store.add_tag(id, &tag)?;
            output.success(&format!("Tagged task {} with '{}'", id.label(), tag.trim()));
            Ok(())
        }
        TaskCommands::Untag { id, tag } => {
            let mut store = session.store()?;
            store.remove_tag(id, &tag)?;
            output.success(&format!("Removed tag '{}' from task {}", tag.trim(), id.label()));
            Ok(())
        }
    }
}

fn add_to_group(output: &Output, session: &Session, request: NewTask, group: GroupId) -> Result<()> {
    let mut board = session.board()?;

    let started = board.begin_add_task(group);
    settle(output, &mut board, started)?;

    let draft = board.draft_mut();
    draft.name = request.name;
    draft.description = request.description;
    draft.start_date = request.start_date;
    draft.end_date = request.end_date;
    draft.estimate_hours = request.estimate_hours;
    draft.assignees = request.assignee_ids;

    let submitted = board.submit();
    if let Created::Task(task) = settle(output, &mut board, submitted)? {
        print_created(output, &task);
    }

    Ok(())
}

fn add_ungrouped(output: &Output, session: &Session, request: NewTask) -> Result<()> {
    let request = request.validated()?;
    let mut store = session.store()?;
    let task = store.create_task(&request).context("Failed to create task")?;

    if output.is_text() {
        output.success(&format!("Created ungrouped task '{}'", task.name));
    }
    print_created(output, &task);

    Ok(())
}

fn print_created(output: &Output, task: &Task) {
    if output.is_json() {
        output.data(task);
    } else {
        println!("  id: {}", task.id.label());
    }
}

fn show_task(output: &Output, session: &Session, id: TaskId) -> Result<()> {
    let store = session.store()?;
    let task = store.get_task(id)?;
    let comments = store.list_comments(id)?;
    let logs = store.list_time_logs(id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task,
            "comments": comments,
            "time_logs": logs,
        }));
        return Ok(());
    }

    println!("Task: {}", task.id.label());
    println!("Name: {}", task.name);
    println!(
        "Group: {}",
        task.group_id
            .map(|g| g.label())
            .unwrap_or_else(|| "none".to_string())
    );
    if task.start_date.is_some() || task.end_date.is_some() {
        println!(
            "Dates: {} .. {}",
            fmt_date(task.start_date),
            fmt_date(task.end_date)
        );
    }
    if let Some(estimate) = task.estimate_hours {
        println!("Estimate: {}h", estimate);
    }
    if !task.assignee_ids.is_empty() {
        let names: Vec<_> = task.assignee_ids.iter().map(|u| u.as_str()).collect();
        println!("Assignees: {}", names.join(", "));
    }
    if !task.tags.is_empty() {
        println!("Tags: {}", task.tags.join(", "));
    }
    println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));

    if let Some(description) = &task.description {
        println!();
        println!("{}", description);
    }

    if !comments.is_empty() {
        println!();
        println!("Comments:");
        for comment in &comments {
            println!(
                "  {} {} ({}): {}",
                comment.id.label(),
                comment.user_id,
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.content
            );
        }
    }

    if !logs.is_empty() {
        let total = logs
            .iter()
            .filter_map(|log| log.duration())
            .fold(chrono::Duration::zero(), |acc, d| acc + d);
        println!();
        println!("Time logged: {}", format_duration(total));
    }

    Ok(())
}

fn update_task(output: &Output, session: &Session, id: TaskId, patch: &TaskPatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field to change.");
    }

    let mut board = session.board()?;
    if board.task(id).is_none() {
        // Belongs to another project
        let mut store = session.store()?;
        let task = store.update_task(id, patch)?;
        output.success(&format!("Updated task '{}'", task.name));
        return Ok(());
    }

    let updated = board.update_task(id, patch);
    settle(output, &mut board, updated)?;
    if output.is_json() {
        output.data(&board.task(id));
    }

    Ok(())
}

fn move_task(output: &Output, session: &Session, id: TaskId, group: Option<GroupId>) -> Result<()> {
    let Some(group) = group else {
        let mut store = session.store()?;
        let task = store.move_task(id, None)?;
        output.success(&format!("Moved task '{}' out of its group", task.name));
        return Ok(());
    };

    let mut board = session.board()?;
    let moved = board.move_task(id, group);
    settle(output, &mut board, moved)?;
    if output.is_json() {
        output.data(&board.task(id));
    }

    Ok(())
}
