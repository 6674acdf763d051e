//! Comment CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{CommentId, NewComment, ProjectId, TaskId, UserId};
use crate::storage::RecordRepository;

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Comment on a task
    Add {
        /// Task ID
        task: TaskId,

        /// Comment text
        content: String,

        /// Author user ID
        #[arg(long, env = "TASKBOARD_USER")]
        user: UserId,
    },

    /// List a task's comments, oldest first
    List {
        /// Task ID
        task: TaskId,
    },

    /// Delete a comment
    Delete {
        /// Comment ID
        id: CommentId,
    },
}

pub fn run(cmd: CommentCommands, output: &Output, project: Option<ProjectId>) -> Result<()> {
    let session = Session::open(project, output)?;
    let mut store = session.store()?;

    match cmd {
        CommentCommands::Add {
            task,
            content,
            user,
        } => {
            let request = NewComment::new(task, user, &content)?;
            let comment = store
                .create_comment(&request)
                .with_context(|| format!("Failed to comment on task {}", task.label()))?;

            if output.is_json() {
                output.data(&comment);
            } else {
                output.success(&format!(
                    "Added comment {} to task {}",
                    comment.id.label(),
                    task.label()
                ));
            }
        }

        CommentCommands::List { task } => {
            let comments = store.list_comments(task)?;

            if output.is_json() {
                output.data(&comments);
            } else if comments.is_empty() {
                println!("No comments on task {}", task.label());
            } else {
                for comment in &comments {
                    output.row(&[
                        comment.id.label().as_str(),
                        comment.created_at.format("%Y-%m-%d %H:%M").to_string().as_str(),
                        comment.user_id.as_str(),
                        comment.content.as_str(),
                    ]);
                }
            }
        }

        CommentCommands::Delete { id } => {
            store.delete_comment(id)?;
            output.success(&format!("Deleted comment {}", id.label()));
        }
    }

    Ok(())
}
