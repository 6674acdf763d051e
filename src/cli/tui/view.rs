//! Board view: header, row list and status bar

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::app::{App, InputMode};
use crate::board::NoticeLevel;
use crate::cli::tree::{indent, row_text};
use crate::domain::{Row, RowKind};
use crate::storage::Repository;

const HELP: &str = "j/k move  enter toggle  a task  n subgroup  N group  r rename  \
                    space select  * all  d delete  m/p move  R reload  q quit";

pub fn draw<R: Repository>(frame: &mut Frame, app: &App<R>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Rows
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_rows(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);
}

fn draw_header<R: Repository>(frame: &mut Frame, app: &App<R>, area: Rect) {
    let board = app.board();
    let mut text = format!(
        "{}  |  {} groups, {} tasks",
        app.title(),
        board.groups().len(),
        board.tasks().len()
    );
    if !board.selection().is_empty() {
        text.push_str(&format!("  |  {} selected", board.selection().len()));
    }

    let header = Paragraph::new(text)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_rows<R: Repository>(frame: &mut Frame, app: &App<R>, area: Rect) {
    let board = app.board();
    let rows = board.rows();
    let width = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let key = row.key();
            let check = if row.is_placeholder() {
                "    "
            } else if board.selection().contains(key) {
                "[x] "
            } else {
                "[ ] "
            };

            let text = indent(row, &row_text(row, &board.draft().name));
            let line = fit_width(&format!("{}{}", check, text), width);

            let style = if app.carrying() == Some(key) {
                Style::default().fg(Color::Yellow)
            } else {
                row_style(row)
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().title("Board").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !empty {
        state.select(Some(app.cursor()));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn row_style(row: &Row<'_>) -> Style {
    match row.kind {
        RowKind::Group { .. } => Style::default().add_modifier(Modifier::BOLD),
        RowKind::Task { .. } => Style::default(),
        RowKind::AddGroup { .. } | RowKind::AddTask { .. } => Style::default().fg(Color::Green),
    }
}

fn draw_status_bar<R: Repository>(frame: &mut Frame, app: &App<R>, area: Rect) {
    let (content, style) = match app.input_mode() {
        InputMode::Normal => match app.status() {
            Some(notice) => {
                let color = match notice.level {
                    NoticeLevel::Success => Color::Green,
                    NoticeLevel::Error => Color::Red,
                };
                (notice.message.clone(), Style::default().fg(color))
            }
            None => (HELP.to_string(), Style::default()),
        },
        InputMode::Adding => {
            let noun = app.board().pending().map(|p| p.noun()).unwrap_or("item");
            let hint = match app.status() {
                Some(notice) if notice.is_error() => notice.message.clone(),
                _ => "enter save  esc cancel".to_string(),
            };
            (
                format!("New {}: {}_  ({})", noun, app.board().draft().name, hint),
                Style::default().fg(Color::Green),
            )
        }
        InputMode::Renaming { name, .. } => (
            format!("Rename group: {}_", name),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::Confirm(action) => (action.prompt(), Style::default().fg(Color::Yellow)),
    };

    let width = area.width.saturating_sub(2) as usize;
    let paragraph = Paragraph::new(fit_width(&content, width))
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

/// Cuts `s` to at most `width` characters, ending with an ellipsis if cut
fn fit_width(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut cut: String = s.chars().take(width - 1).collect();
    cut.push('…');
    cut
}
