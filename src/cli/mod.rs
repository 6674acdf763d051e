//! # Command-Line Interface
//!
//! User-facing commands, output formatting and the interactive board.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Workspace | Setup and projects | `init`, `project new`, `project use` |
//! | Board | Groups and tasks | `group add`, `task add`, `task move` |
//! | Activity | Task records | `comment add`, `log add` |
//! | Views | Showing the board | `tree`, `board` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Without the flag the global config's `default_format` applies.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! taskboard --verbose tree
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod comment;
mod group;
mod output;
mod project;
mod session;
mod task;
mod time_log;
mod tree;
mod tui;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
