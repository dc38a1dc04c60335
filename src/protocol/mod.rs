//! Wire protocol shared by the server and the client.

mod messages;

pub use messages::{ClientMessage, DEFAULT_PORT, ErrorKind, LeaderboardEntry, ServerMessage};
