//! Time log CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{format_duration, NewTimeLog, ProjectId, TaskId, TimeLog, TimeLogId, UserId};
use crate::storage::RecordRepository;

#[derive(Subcommand)]
pub enum LogCommands {
    /// Log time spent on a task
    ///
    /// Examples:
    ///   taskboard log add t3 --minutes 90 --user alice
    ///   taskboard log add t3 --start 2024-05-01T09:00:00Z --end 2024-05-01T11:30:00Z
    Add {
        /// Task ID
        task: TaskId,

        /// Minutes spent, ending now
        #[arg(long, conflicts_with_all = ["start", "end"])]
        minutes: Option<i64>,

        /// Start time (RFC 3339)
        #[arg(long, required_unless_present = "minutes")]
        start: Option<DateTime<Utc>>,

        /// End time (RFC 3339); omit for a running log
        #[arg(long)]
        end: Option<DateTime<Utc>>,

        /// What the time was spent on
        #[arg(long)]
        desc: Option<String>,

        /// User ID
        #[arg(long, env = "TASKBOARD_USER")]
        user: UserId,
    },

    /// List a task's time logs
    List {
        /// Task ID
        task: TaskId,
    },

    /// Delete a time log
    Delete {
        /// Time log ID
        id: TimeLogId,
    },
}

pub fn run(cmd: LogCommands, output: &Output, project: Option<ProjectId>) -> Result<()> {
    let session = Session::open(project, output)?;
    let mut store = session.store()?;

    match cmd {
        LogCommands::Add {
            task,
            minutes,
            start,
            end,
            desc,
            user,
        } => {
            let (start, end) = match (minutes, start) {
                (Some(minutes), _) => {
                    if minutes <= 0 {
                        anyhow::bail!("--minutes must be positive");
                    }
                    let end = Utc::now();
                    (end - Duration::minutes(minutes), Some(end))
                }
                (None, Some(start)) => (start, end),
                (None, None) => anyhow::bail!("Pass --minutes or --start"),
            };

            let mut request = NewTimeLog::new(task, user, start, end)?;
            request.description = desc.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

            let log = store
                .create_time_log(&request)
                .with_context(|| format!("Failed to log time on task {}", task.label()))?;

            if output.is_json() {
                output.data(&log);
            } else {
                output.success(&format!(
                    "Logged {} on task {} ({})",
                    log_duration(&log),
                    task.label(),
                    log.id.label()
                ));
            }
        }

        LogCommands::List { task } => {
            let logs = store.list_time_logs(task)?;

            if output.is_json() {
                output.data(&logs);
            } else if logs.is_empty() {
                println!("No time logged on task {}", task.label());
            } else {
                for log in &logs {
                    output.row(&[
                        log.id.label().as_str(),
                        log.user_id.as_str(),
                        log.start_time.format("%Y-%m-%d %H:%M").to_string().as_str(),
                        log_duration(log).as_str(),
                        log.description.as_deref().unwrap_or(""),
                    ]);
                }
            }
        }

        LogCommands::Delete { id } => {
            store.delete_time_log(id)?;
            output.success(&format!("Deleted time log {}", id.label()));
        }
    }

    Ok(())
}

fn log_duration(log: &TimeLog) -> String {
    log.duration()
        .map(format_duration)
        .unwrap_or_else(|| "running".to_string())
}
