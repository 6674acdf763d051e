//! Task group CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::{settle, Session};
use crate::board::Created;
use crate::domain::{GroupId, ProjectId};

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Add a group at the top level or under a parent group
    ///
    /// Examples:
    ///   taskboard group add "Phase 1"
    ///   taskboard group add "Research" --parent g1
    Add {
        /// Group name
        name: String,

        /// Parent group ID
        #[arg(long)]
        parent: Option<GroupId>,
    },

    /// Rename a group
    Rename {
        /// Group ID
        id: GroupId,

        /// New name
        name: String,
    },

    /// Move a group under another group, or to the top level
    Move {
        /// Group ID
        id: GroupId,

        /// New parent group ID (omit for top level)
        #[arg(long)]
        parent: Option<GroupId>,
    },

    /// Delete a group with every group and task below it
    Delete {
        /// Group ID
        id: GroupId,
    },
}

pub fn run(cmd: GroupCommands, output: &Output, project: Option<ProjectId>) -> Result<()> {
    let session = Session::open(project, output)?;
    let mut board = session.board()?;
    output.verbose_ctx(
        "group",
        &format!(
            "Loaded {} groups and {} tasks",
            board.groups().len(),
            board.tasks().len()
        ),
    );

    match cmd {
        GroupCommands::Add { name, parent } => {
            let started = board.begin_add_group(parent);
            settle(output, &mut board, started)?;
            board.draft_mut().name = name;

            let submitted = board.submit();
            if let Created::Group(group) = settle(output, &mut board, submitted)? {
                if output.is_json() {
                    output.data(&group);
                } else {
                    println!("  id: {}", group.id.label());
                }
            }
        }

        GroupCommands::Rename { id, name } => {
            let renamed = board.rename_group(id, &name);
            settle(output, &mut board, renamed)?;
            if output.is_json() {
                output.data(&board.group(id));
            }
        }

        GroupCommands::Move { id, parent } => {
            let moved = board.move_group(id, parent);
            settle(output, &mut board, moved)?;
            if output.is_json() {
                output.data(&board.group(id));
            }
        }

        GroupCommands::Delete { id } => {
            let deleted = board.delete_group(id);
            let report = settle(output, &mut board, deleted)?;
            output.verbose_ctx(
                "group",
                &format!(
                    "Deleted groups {:?} and tasks {:?}",
                    report.deleted_groups, report.deleted_tasks
                ),
            );

            if output.is_json() {
                output.data(&report);
            }
            if !report.is_complete() {
                anyhow::bail!(
                    "Group {} was not fully deleted ({} failed, {} blocked)",
                    id.label(),
                    report.failures.len(),
                    report.blocked.len()
                );
            }
        }
    }

    Ok(())
}
