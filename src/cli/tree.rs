//! Printing the board as an indented tree

use anyhow::Result;
use serde::Serialize;

use super::output::Output;
use super::project::fmt_date;
use super::session::Session;
use crate::domain::{GroupForest, GroupId, ProjectId, Row, RowKind, Task, TaskGroup, TaskId};
use crate::storage::RecordRepository;

/// Records that exist in the store but have no row on the board
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct Hidden {
    pub ungrouped_tasks: Vec<TaskId>,
    /// Tasks whose group does not exist
    pub dangling_tasks: Vec<TaskId>,
    /// Groups on a parent cycle
    pub cyclic_groups: Vec<GroupId>,
}

impl Hidden {
    pub(crate) fn find(groups: &[TaskGroup], tasks: &[Task]) -> Self {
        let forest = GroupForest::new(groups, tasks);
        Self {
            ungrouped_tasks: tasks
                .iter()
                .filter(|t| t.is_ungrouped())
                .map(|t| t.id)
                .collect(),
            dangling_tasks: forest.dangling_tasks(),
            cyclic_groups: forest.cyclic_groups(),
        }
    }
}

/// Collapse flags applied before printing
#[derive(Debug, Default)]
pub struct TreeOptions {
    pub collapse: Vec<GroupId>,
    pub collapse_all: bool,
    pub expand_all: bool,
}

pub fn run(output: &Output, project: Option<ProjectId>, options: TreeOptions) -> Result<()> {
    let session = Session::open(project, output)?;
    let mut board = session.board()?;
    let project = board.repo().get_project(board.project())?;

    if options.expand_all {
        board.expand_all();
    }
    if options.collapse_all {
        board.collapse_all();
    }
    for id in options.collapse {
        if board.group(id).is_none() {
            anyhow::bail!("Group not found: {}", id.label());
        }
        board.set_expanded(id, false);
    }

    let rows = board.rows();
    let hidden = Hidden::find(board.groups(), board.tasks());
    output.verbose_ctx("tree", &format!("Built {} rows", rows.len()));
    if !hidden.dangling_tasks.is_empty() {
        output.verbose_ctx(
            "tree",
            &format!("{} tasks hidden: missing group", hidden.dangling_tasks.len()),
        );
    }
    if !hidden.cyclic_groups.is_empty() {
        output.verbose_ctx(
            "tree",
            &format!("{} groups hidden: parent cycle", hidden.cyclic_groups.len()),
        );
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "project": project,
            "rows": rows,
            "hidden": hidden,
        }));
        return Ok(());
    }

    println!("{} {}", project.id.label(), project.name);
    if rows.is_empty() {
        println!("  (no groups yet; add one with 'taskboard group add <NAME>')");
    }
    for row in &rows {
        println!("{}", indent(row, &row_text(row, "")));
    }
    if !hidden.ungrouped_tasks.is_empty() {
        println!(
            "  ({} ungrouped tasks not shown; move one with 'taskboard task move <ID> --group <GROUP>')",
            hidden.ungrouped_tasks.len()
        );
    }

    Ok(())
}

/// Prefixes `text` with two spaces per level
pub(crate) fn indent(row: &Row<'_>, text: &str) -> String {
    format!("{}{}", "  ".repeat(row.level + 1), text)
}

/// One row as plain text; `draft` fills placeholder rows
pub(crate) fn row_text(row: &Row<'_>, draft: &str) -> String {
    match row.kind {
        RowKind::Group { group, expanded } => {
            let marker = if expanded { "[-]" } else { "[+]" };
            format!("{} {} {}", marker, group.id.label(), group.name)
        }
        RowKind::Task { task } => {
            let details = task_details(task);
            if details.is_empty() {
                format!("    {} {}", task.id.label(), task.name)
            } else {
                format!("    {} {}  ({})", task.id.label(), task.name, details)
            }
        }
        RowKind::AddGroup { .. } => format!("[ ] new group: {}", draft),
        RowKind::AddTask { .. } => format!("    new task: {}", draft),
    }
}

/// Assignees, dates, estimate and tags, separated by "; "
pub(crate) fn task_details(task: &Task) -> String {
    let mut parts = Vec::new();

    if !task.assignee_ids.is_empty() {
        let names: Vec<_> = task.assignee_ids.iter().map(|u| u.as_str()).collect();
        parts.push(names.join(", "));
    }
    if task.start_date.is_some() || task.end_date.is_some() {
        parts.push(format!(
            "{} .. {}",
            fmt_date(task.start_date),
            fmt_date(task.end_date)
        ));
    }
    if let Some(estimate) = task.estimate_hours {
        parts.push(format!("{}h", estimate));
    }
    if !task.tags.is_empty() {
        let tags: Vec<_> = task.tags.iter().map(|t| format!("#{}", t)).collect();
        parts.push(tags.join(" "));
    }

    parts.join("; ")
}
