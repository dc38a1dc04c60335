//! Main console UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::server::state::{ConsoleState, ConsoleView};

use super::{activity, help, leaderboard};

/// Render the console UI based on current state.
pub fn render(frame: &mut Frame, state: &ConsoleState) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Main content
        Constraint::Length(3), // Command history (last message)
        Constraint::Length(3), // Command input
    ])
    .split(area);

    render_header(frame, chunks[0], state);
    render_main_content(frame, chunks[1], state);
    render_command_history(frame, chunks[2], state);
    render_command_input(frame, chunks[3], state);
}

/// Render the header with status info.
fn render_header(frame: &mut Frame, area: Rect, state: &ConsoleState) {
    let header_text = format!(
        " Listening: {}  |  Store: {}  |  Questions: {}  |  Shown: {}  |  Submissions: {}",
        state.addr,
        state.store_name,
        state.question_count,
        state.leaderboard.len(),
        state.submissions
    );

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Green).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Quiz Board ")
                .title_style(Style::default().fg(Color::Cyan).bold()),
        );

    frame.render_widget(header, area);
}

/// Render the main content based on current view.
fn render_main_content(frame: &mut Frame, area: Rect, state: &ConsoleState) {
    match state.current_view {
        ConsoleView::Leaderboard => leaderboard::render(frame, area, state),
        ConsoleView::Activity => activity::render(frame, area, state),
        ConsoleView::Help => help::render(frame, area),
    }
}

/// Render the last command history message.
fn render_command_history(frame: &mut Frame, area: Rect, state: &ConsoleState) {
    let last_msg = state
        .command_history
        .last()
        .map(|s| s.as_str())
        .unwrap_or("");

    let history = Paragraph::new(last_msg)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));

    frame.render_widget(history, area);
}

/// Render the command input bar.
fn render_command_input(frame: &mut Frame, area: Rect, state: &ConsoleState) {
    let input_text = format!("> {}", state.command_input);

    let input = Paragraph::new(input_text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(input, area);

    let cursor_x = area.x + 3 + state.command_input.chars().count() as u16;
    let cursor_y = area.y + 1;
    frame.set_cursor_position(Position::new(cursor_x, cursor_y));
}
