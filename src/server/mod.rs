//! Quiz server module.
//!
//! Serves scoring and leaderboard requests over WebSocket, with an optional
//! host console for administration.

mod commands;
mod server;
mod state;
mod ui;

pub use server::{QuizServer, handle_request, run};
