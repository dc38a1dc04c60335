//! Host console command parser and executor.
//!
//! Handles host commands like `top`, `clear`, `view`, etc.

use crate::service::QuizService;

use super::state::{ConsoleState, ConsoleView};

/// Largest leaderboard the console will ask for.
const MAX_TOP: u32 = 100;

/// Result of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Command executed successfully with optional message.
    Ok(Option<String>),
    /// Command failed with an error message.
    Error(String),
    /// Server should quit.
    Quit,
}

/// Parse and execute a command.
pub async fn execute_command(
    service: &QuizService,
    state: &mut ConsoleState,
    input: &str,
) -> CommandResult {
    let input = input.trim();
    if input.is_empty() {
        return CommandResult::Ok(None);
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    let command = parts[0].to_lowercase();
    let args = &parts[1..];

    match command.as_str() {
        "top" => cmd_top(service, state, args).await,
        "clear" => cmd_clear(service).await,
        "refresh" => cmd_refresh(service, state).await,
        "view" => cmd_view(state, args),
        "quit" | "exit" => cmd_quit(state),
        "help" | "?" => cmd_help(state),
        _ => CommandResult::Error(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            command
        )),
    }
}

/// Re-read the leaderboard into the console snapshot.
pub async fn refresh_leaderboard(service: &QuizService, state: &mut ConsoleState) -> CommandResult {
    match service.leaderboard(Some(state.leaderboard_limit)).await {
        Ok(records) => {
            state.set_leaderboard(records);
            CommandResult::Ok(None)
        }
        Err(e) => {
            // Wait for the next change before reading again.
            state.leaderboard_stale = false;
            CommandResult::Error(format!("Failed to read leaderboard: {}", e))
        }
    }
}

/// Show the top N players.
async fn cmd_top(service: &QuizService, state: &mut ConsoleState, args: &[&str]) -> CommandResult {
    let limit = match args.first() {
        None => state.leaderboard_limit,
        Some(arg) => match arg.parse::<u32>() {
            Ok(n) if (1..=MAX_TOP).contains(&n) => n,
            _ => {
                return CommandResult::Error(format!(
                    "Usage: top [n] (n between 1 and {})",
                    MAX_TOP
                ));
            }
        },
    };

    state.leaderboard_limit = limit;
    state.show(ConsoleView::Leaderboard);

    match refresh_leaderboard(service, state).await {
        CommandResult::Ok(_) => CommandResult::Ok(Some(format!("Showing top {}.", limit))),
        other => other,
    }
}

/// Clear the leaderboard.
async fn cmd_clear(service: &QuizService) -> CommandResult {
    match service.clear_leaderboard().await {
        Ok(()) => CommandResult::Ok(None),
        Err(e) => CommandResult::Error(format!("Failed to clear leaderboard: {}", e)),
    }
}

async fn cmd_refresh(service: &QuizService, state: &mut ConsoleState) -> CommandResult {
    match refresh_leaderboard(service, state).await {
        CommandResult::Ok(_) => CommandResult::Ok(Some("Leaderboard refreshed.".to_string())),
        other => other,
    }
}

/// Switch between the leaderboard and activity views.
fn cmd_view(state: &mut ConsoleState, args: &[&str]) -> CommandResult {
    match args.first().map(|a| a.to_lowercase()).as_deref() {
        None | Some("leaderboard") | Some("board") => {
            state.show(ConsoleView::Leaderboard);
            CommandResult::Ok(None)
        }
        Some("activity") => {
            state.show(ConsoleView::Activity);
            CommandResult::Ok(None)
        }
        Some(other) => CommandResult::Error(format!("Unknown view: {}", other)),
    }
}

/// Quit the server.
fn cmd_quit(state: &mut ConsoleState) -> CommandResult {
    state.should_quit = true;
    CommandResult::Quit
}

/// Show help.
fn cmd_help(state: &mut ConsoleState) -> CommandResult {
    state.show(ConsoleView::Help);
    CommandResult::Ok(None)
}
