//! Interactive terminal board
//!
//! Renders a project's rows with ratatui and maps keys onto [`Board`]
//! actions. Key events are read on a helper thread and handed over a
//! channel; all board state stays on the main thread.
//!
//! [`Board`]: crate::board::Board

mod app;
mod event;
mod terminal;
mod view;

use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

use super::Output;
use crate::board::Board;
use crate::storage::SqliteStore;
use app::App;
use event::EventHandler;

/// Milliseconds between ticks
const TICK_RATE_MS: u64 = 250;

/// Launch the board for an already loaded project
pub fn run(output: &Output, board: Board<SqliteStore>, title: String) -> Result<()> {
    output.verbose_ctx("board", "Starting interactive board");

    let mut terminal = terminal::init()?;
    let mut app = App::new(board, title);
    let events = EventHandler::new(TICK_RATE_MS);

    // Restore the terminal even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| app.run(&mut terminal, events)));
    let restored = terminal::restore();

    match result {
        Ok(inner) => {
            restored?;
            inner
        }
        Err(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                Err(anyhow!("Board panicked: {}", s))
            } else if let Some(s) = payload.downcast_ref::<String>() {
                Err(anyhow!("Board panicked: {}", s))
            } else {
                Err(anyhow!("Board panicked with unknown error"))
            }
        }
    }
}
