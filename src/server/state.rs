//! Host console state.
//!
//! Holds what the console renders: the current view, command input and
//! history, the last leaderboard snapshot and a feed of recent submissions.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};

use crate::models::{ScoreRecord, SubmitOutcome};
use crate::protocol::LeaderboardEntry;
use crate::service::ScoreEvent;
use crate::store::DEFAULT_LEADERBOARD_LIMIT;

const MAX_HISTORY: usize = 100;
const MAX_ACTIVITY: usize = 50;

/// What view the host is currently seeing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleView {
    /// Ranked leaderboard.
    #[default]
    Leaderboard,
    /// Recent submissions as they arrive.
    Activity,
    /// Help view showing available commands.
    Help,
}

/// A leaderboard change seen by the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub event: ScoreEvent,
}

/// Main console state.
pub struct ConsoleState {
    /// Address the server is listening on (for display).
    pub addr: SocketAddr,
    /// Backend name of the score store (for display).
    pub store_name: String,
    /// Number of questions in the catalog.
    pub question_count: usize,
    /// Current view for the host.
    pub current_view: ConsoleView,
    /// Previous view (for returning from Help).
    pub previous_view: Option<ConsoleView>,
    /// Current command input.
    pub command_input: String,
    /// Command history for display.
    pub command_history: Vec<String>,
    /// Last leaderboard read.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// How many entries the leaderboard view asks for.
    pub leaderboard_limit: u32,
    /// Set when the snapshot may be out of date.
    pub leaderboard_stale: bool,
    /// Recent submissions, oldest first.
    pub activity: Vec<ActivityEntry>,
    /// Submissions seen since the console started.
    pub submissions: usize,
    /// Whether the server should shut down.
    pub should_quit: bool,
}

impl ConsoleState {
    pub fn new(addr: SocketAddr, store_name: impl Into<String>, question_count: usize) -> Self {
        Self {
            addr,
            store_name: store_name.into(),
            question_count,
            current_view: ConsoleView::Leaderboard,
            previous_view: None,
            command_input: String::new(),
            command_history: Vec::new(),
            leaderboard: Vec::new(),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            leaderboard_stale: true,
            activity: Vec::new(),
            submissions: 0,
            should_quit: false,
        }
    }

    /// Replace the leaderboard snapshot.
    pub fn set_leaderboard(&mut self, records: Vec<ScoreRecord>) {
        self.leaderboard = LeaderboardEntry::rank_all(records);
        self.leaderboard_stale = false;
    }

    /// Record a change published by the quiz service.
    pub fn record_event(&mut self, event: ScoreEvent) {
        match &event {
            ScoreEvent::Submitted {
                player_name,
                score,
                total_questions,
                outcome,
            } => {
                self.submissions += 1;
                if *outcome != SubmitOutcome::Unchanged {
                    self.leaderboard_stale = true;
                }
                self.add_to_history(format!(
                    "{} scored {}/{} ({})",
                    player_name,
                    score,
                    total_questions,
                    outcome.as_str()
                ));
            }
            ScoreEvent::Cleared => {
                self.leaderboard_stale = true;
                self.add_to_history("Leaderboard cleared".to_string());
            }
        }

        self.activity.push(ActivityEntry {
            at: Utc::now(),
            event,
        });

        if self.activity.len() > MAX_ACTIVITY {
            self.activity.remove(0);
        }
    }

    /// Switch to `view`, remembering where Help should return to.
    pub fn show(&mut self, view: ConsoleView) {
        if view == ConsoleView::Help && self.current_view != ConsoleView::Help {
            self.previous_view = Some(self.current_view);
        }
        self.current_view = view;
    }

    /// Leave the Help view.
    pub fn close_help(&mut self) {
        self.current_view = self.previous_view.take().unwrap_or_default();
    }

    /// Add a message to command history.
    pub fn add_to_history(&mut self, msg: String) {
        self.command_history.push(msg);
        if self.command_history.len() > MAX_HISTORY {
            self.command_history.remove(0);
        }
    }
}
