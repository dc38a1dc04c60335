//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Args;

use crate::protocol::DEFAULT_PORT;

/// Default SQLite database, relative to the working directory.
pub const DEFAULT_DATABASE: &str = "sqlite://quiz-board.db";

/// Options for `quiz-board serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "QUIZ_BOARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "QUIZ_BOARD_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// SQLite path or URL for the leaderboard, or "memory" for a throwaway store
    #[arg(long, env = "QUIZ_BOARD_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// JSON file to load the questions from (the built-in catalog when omitted)
    #[arg(short, long, env = "QUIZ_BOARD_QUESTIONS")]
    pub questions: Option<PathBuf>,

    /// Run without the host console
    #[arg(long)]
    pub headless: bool,

    /// Where logs go while the host console owns the terminal
    #[arg(long, env = "QUIZ_BOARD_LOG_FILE", default_value = "quiz-board.log")]
    pub log_file: PathBuf,
}

/// Options for commands that talk to a running server.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Server host
    #[arg(long, env = "QUIZ_BOARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "QUIZ_BOARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl RemoteArgs {
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database: String,
    pub questions: Option<PathBuf>,
    pub console: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            database: DEFAULT_DATABASE.to_string(),
            questions: None,
            console: true,
        }
    }
}

impl From<&ServeArgs> for ServerConfig {
    fn from(args: &ServeArgs) -> Self {
        Self {
            addr: SocketAddr::new(args.bind, args.port),
            database: args.database.clone(),
            questions: args.questions.clone(),
            console: !args.headless,
        }
    }
}
