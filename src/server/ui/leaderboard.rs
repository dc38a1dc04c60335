//! Leaderboard view for the console.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::server::state::ConsoleState;

/// Render the leaderboard view.
pub fn render(frame: &mut Frame, area: Rect, state: &ConsoleState) {
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        format!(
            "  {:<5}{:<24}{:<12}{:<8}{}",
            "#", "Player", "Score", "%", "Recorded"
        ),
        Style::default().fg(Color::DarkGray),
    ))];

    for entry in &state.leaderboard {
        let pct = if entry.total_questions > 0 {
            (entry.score as f64 / entry.total_questions as f64) * 100.0
        } else {
            0.0
        };

        let rank_color = match entry.rank {
            1 => Color::Yellow,
            2 => Color::White,
            3 => Color::LightRed,
            _ => Color::DarkGray,
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<5}", entry.rank),
                Style::default().fg(rank_color).bold(),
            ),
            Span::styled(
                format!("{:<24}", entry.player_name),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("{:<12}", format!("{}/{}", entry.score, entry.total_questions)),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("{:<8}", format!("{:.0}%", pct)),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                entry.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    if state.leaderboard.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No scores yet...",
            Style::default().fg(Color::DarkGray).italic(),
        )));
    }

    let title = format!(" Top {} ", state.leaderboard_limit);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}
