//! Help view for the console.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

const COMMANDS: [(&str, &str); 7] = [
    ("top [n]", "Show the top n players (default 10)"),
    ("refresh", "Re-read the leaderboard"),
    ("clear", "Delete every leaderboard entry"),
    ("view activity", "Show recent submissions"),
    ("view board", "Show the leaderboard"),
    ("quit / exit", "Shutdown server"),
    ("help / ?", "Show this help"),
];

/// Render the help view.
pub fn render(frame: &mut Frame, area: Rect) {
    let mut help_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "AVAILABLE COMMANDS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
    ];

    help_text.extend(COMMANDS.iter().map(|(command, description)| {
        Line::from(vec![
            Span::styled(format!("  {:<15}", command), Style::default().fg(Color::Yellow)),
            Span::raw(*description),
        ])
    }));

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        "Tab switches views. Press Esc or Enter to close",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Help ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(2)),
    );

    frame.render_widget(widget, area);
}
