//! TUI application state and key handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;

use anyhow::Result;

use super::event::{Event, EventHandler};
use super::terminal::Terminal;
use super::view;
use crate::board::{Board, Created, Notice};
use crate::domain::{GroupId, RowKey, RowKind, TaskId};
use crate::storage::Repository;

/// Ticks a notice stays in the status bar
const NOTICE_TICKS: u16 = 16;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing the name of the pending add into the board's draft
    Adding,
    Renaming {
        group: GroupId,
        name: String,
    },
    Confirm(ConfirmAction),
}

/// Actions that need a y/n answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteGroup(GroupId),
    DeleteTask(TaskId),
    DeleteSelected(usize),
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            ConfirmAction::DeleteGroup(id) => {
                format!("Delete group {} and everything in it? [y/n]", id.label())
            }
            ConfirmAction::DeleteTask(id) => format!("Delete task {}? [y/n]", id.label()),
            ConfirmAction::DeleteSelected(count) => {
                format!("Delete {} selected items? [y/n]", count)
            }
        }
    }
}

/// Application state
pub struct App<R> {
    board: Board<R>,

    /// Header text
    title: String,

    /// Index into the board's rows
    cursor: usize,

    input_mode: InputMode,

    /// Row picked up with `m`, waiting to be dropped with `p`
    carrying: Option<RowKey>,

    status: Option<Notice>,
    status_ticks: u16,
    should_quit: bool,
}

impl<R: Repository> App<R> {
    pub fn new(board: Board<R>, title: impl Into<String>) -> Self {
        Self {
            board,
            title: title.into(),
            cursor: 0,
            input_mode: InputMode::Normal,
            carrying: None,
            status: None,
            status_ticks: 0,
            should_quit: false,
        }
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize => {}
                Event::Tick => self.tick(),
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        view::draw(frame, self);
    }

    /// Expires the status notice
    pub fn tick(&mut self) {
        if self.status_ticks > 0 {
            self.status_ticks -= 1;
            if self.status_ticks == 0 {
                self.status = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match &self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Adding => self.handle_adding_key(key),
            InputMode::Renaming { .. } => self.handle_rename_key(key),
            InputMode::Confirm(_) => self.handle_confirm_key(key),
        }

        self.collect_notices();
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.cursor = self.board.rows().len().saturating_sub(1);
            }

            // Expand/collapse
            KeyCode::Enter => {
                if let Some(RowKey::Group(id)) = self.cursor_key() {
                    self.board.toggle(id);
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(RowKey::Group(id)) = self.cursor_key() {
                    self.board.set_expanded(id, true);
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.collapse_or_parent(),
            KeyCode::Char('+') => self.keep_cursor(|board| board.expand_all()),
            KeyCode::Char('-') => self.keep_cursor(|board| board.collapse_all()),

            // Selection
            KeyCode::Char(' ') => {
                if let Some(key) = self.cursor_key() {
                    self.board.toggle_selection(key);
                }
            }
            KeyCode::Char('*') => self.board.select_all(),
            KeyCode::Esc => {
                self.board.clear_selection();
                self.carrying = None;
            }

            // Adding
            KeyCode::Char('a') => {
                if let Some(group) = self.cursor_group() {
                    if self.board.begin_add_task(group).is_ok() {
                        self.start_adding(RowKey::AddTask);
                    }
                }
            }
            KeyCode::Char('n') => {
                if let Some(group) = self.cursor_group() {
                    if self.board.begin_add_group(Some(group)).is_ok() {
                        self.start_adding(RowKey::AddGroup);
                    }
                }
            }
            KeyCode::Char('N') => {
                if self.board.begin_add_group(None).is_ok() {
                    self.start_adding(RowKey::AddGroup);
                }
            }

            // Editing
            KeyCode::Char('r') => {
                if let Some(RowKey::Group(id)) = self.cursor_key() {
                    let name = self
                        .board
                        .group(id)
                        .map(|g| g.name.clone())
                        .unwrap_or_default();
                    self.input_mode = InputMode::Renaming { group: id, name };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('m') => {
                self.carrying = self
                    .cursor_key()
                    .filter(|key| matches!(key, RowKey::Group(_) | RowKey::Task(_)));
            }
            KeyCode::Char('p') => {
                let target = self.cursor_group();
                if let Some(target) = target {
                    self.drop_carried(Some(target));
                }
            }
            KeyCode::Char('P') => self.drop_carried(None),

            KeyCode::Char('R') => self.keep_cursor(|board| {
                // Failures surface as notices
                let _ = board.reload();
            }),

            _ => {}
        }
    }

    fn handle_adding_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.board.cancel_add();
                self.input_mode = InputMode::Normal;
                self.clamp_cursor();
            }
            KeyCode::Enter => {
                let submitted = self.board.submit();
                if self.board.pending().is_none() {
                    self.input_mode = InputMode::Normal;
                }
                match submitted {
                    Ok(Created::Group(group)) => self.focus(RowKey::Group(group.id)),
                    Ok(Created::Task(task)) => self.focus(RowKey::Task(task.id)),
                    Err(_) => self.clamp_cursor(),
                }
            }
            KeyCode::Backspace => {
                self.board.draft_mut().name.pop();
            }
            KeyCode::Char(c) => self.board.draft_mut().name.push(c),
            _ => {}
        }
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        let InputMode::Renaming { group, name } = &mut self.input_mode else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                let (group, name) = (*group, std::mem::take(name));
                self.input_mode = InputMode::Normal;
                // Failures surface as notices
                let _ = self.board.rename_group(group, &name);
            }
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Char(c) => name.push(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let InputMode::Confirm(action) = self.input_mode else {
            return;
        };

        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let anchor = self.cursor_key();
                match action {
                    ConfirmAction::DeleteGroup(id) => {
                        let _ = self.board.delete_group(id);
                    }
                    ConfirmAction::DeleteTask(id) => {
                        let _ = self.board.delete_task(id);
                    }
                    ConfirmAction::DeleteSelected(_) => {
                        let _ = self.board.delete_selected();
                    }
                }
                match anchor {
                    Some(key) => self.focus(key),
                    None => self.clamp_cursor(),
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.input_mode = InputMode::Normal,
            _ => {}
        }
    }

    fn start_adding(&mut self, placeholder: RowKey) {
        self.input_mode = InputMode::Adding;
        self.focus(placeholder);
    }

    fn request_delete(&mut self) {
        let selected = self.board.selection().len();
        let action = if selected > 0 {
            Some(ConfirmAction::DeleteSelected(selected))
        } else {
            match self.cursor_key() {
                Some(RowKey::Group(id)) => Some(ConfirmAction::DeleteGroup(id)),
                Some(RowKey::Task(id)) => Some(ConfirmAction::DeleteTask(id)),
                _ => None,
            }
        };

        if let Some(action) = action {
            self.input_mode = InputMode::Confirm(action);
        }
    }

    /// Re-parents the carried row under `target`, or at the top level
    fn drop_carried(&mut self, target: Option<GroupId>) {
        let Some(carried) = self.carrying.take() else {
            return;
        };

        let _ = match (carried, target) {
            (RowKey::Group(id), parent) => self.board.move_group(id, parent),
            (RowKey::Task(id), Some(group)) => self.board.move_task(id, group),
            // Tasks only live inside groups on the board
            _ => {
                self.carrying = Some(carried);
                return;
            }
        };
        self.focus(carried);
    }

    /// Collapses the group under the cursor, or jumps to the enclosing group
    fn collapse_or_parent(&mut self) {
        let rows = self.board.rows();
        let Some(row) = rows.get(self.cursor) else {
            return;
        };

        let (collapse, parent) = match row.kind {
            RowKind::Group { group, expanded } => (expanded.then_some(group.id), group.parent_id),
            RowKind::Task { task } => (None, task.group_id),
            RowKind::AddGroup { parent } => (None, parent),
            RowKind::AddTask { group } => (None, Some(group)),
        };
        drop(rows);

        match (collapse, parent) {
            (Some(id), _) => self.board.set_expanded(id, false),
            (None, Some(parent)) => self.focus(RowKey::Group(parent)),
            (None, None) => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.board.rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Runs `action`, then puts the cursor back on the same row if it survived
    fn keep_cursor(&mut self, action: impl FnOnce(&mut Board<R>)) {
        let anchor = self.cursor_key();
        action(&mut self.board);
        match anchor {
            Some(key) => self.focus(key),
            None => self.clamp_cursor(),
        }
    }

    fn focus(&mut self, key: RowKey) {
        match self.board.row_index(key) {
            Some(index) => self.cursor = index,
            None => self.clamp_cursor(),
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.board.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn collect_notices(&mut self) {
        if let Some(notice) = self.board.take_notices().pop() {
            self.status = Some(notice);
            self.status_ticks = NOTICE_TICKS;
        }
    }

    pub fn cursor_key(&self) -> Option<RowKey> {
        self.board.rows().get(self.cursor).map(|row| row.key())
    }

    /// Group the cursor is on, or the group of the task it is on
    pub fn cursor_group(&self) -> Option<GroupId> {
        let rows = self.board.rows();
        let row = rows.get(self.cursor)?;
        let group = match row.kind {
            RowKind::Group { group, .. } => Some(group.id),
            RowKind::Task { task } => task.group_id,
            RowKind::AddGroup { .. } | RowKind::AddTask { .. } => None,
        };
        group
    }

    pub fn board(&self) -> &Board<R> {
        &self.board
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn carrying(&self) -> Option<RowKey> {
        self.carrying
    }

    pub fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
