//! Quiz client module.
//!
//! Provides a request/response WebSocket client for a quiz server.

mod client;

pub use client::{ClientError, QuizClient, SubmitReply};
