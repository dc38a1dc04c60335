//! Live submission feed for the console.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::models::SubmitOutcome;
use crate::server::state::ConsoleState;
use crate::service::ScoreEvent;

/// Render the activity view.
pub fn render(frame: &mut Frame, area: Rect, state: &ConsoleState) {
    let mut lines: Vec<Line> = Vec::new();

    // Show last N events (most recent first)
    let max_display = (area.height as usize).saturating_sub(2);
    let recent: Vec<_> = state.activity.iter().rev().take(max_display).collect();

    for entry in recent {
        let time = Span::styled(
            format!("  {} ", entry.at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        );

        let line = match &entry.event {
            ScoreEvent::Submitted {
                player_name,
                score,
                total_questions,
                outcome,
            } => {
                let (symbol, color) = match outcome {
                    SubmitOutcome::Created => ("+", Color::Green),
                    SubmitOutcome::Updated => ("^", Color::Yellow),
                    SubmitOutcome::Unchanged => ("=", Color::DarkGray),
                };
                Line::from(vec![
                    time,
                    Span::styled(format!("{} ", symbol), Style::default().fg(color)),
                    Span::styled(
                        format!("{:<24}", player_name),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:>3}/{:<3} ", score, total_questions),
                        Style::default().fg(color),
                    ),
                    Span::styled(outcome.as_str(), Style::default().fg(Color::DarkGray)),
                ])
            }
            ScoreEvent::Cleared => Line::from(vec![
                time,
                Span::styled("x ", Style::default().fg(Color::Red)),
                Span::styled("leaderboard cleared", Style::default().fg(Color::Red)),
            ]),
        };

        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Waiting for submissions...",
            Style::default().fg(Color::DarkGray).italic(),
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Activity ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}
