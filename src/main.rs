use std::fs::OpenOptions;
use std::path::Path;
use std::process;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use quiz_board::config::{RemoteArgs, ServeArgs};
use quiz_board::protocol::LeaderboardEntry;
use quiz_board::{DEFAULT_LEADERBOARD_LIMIT, QuizClient, ServerConfig, server};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quiz-board", version, about = "Trivia quiz scoring with a best-score leaderboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the quiz server
    Serve(ServeArgs),

    /// Print the leaderboard of a running server
    Leaderboard {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Number of entries to show
        #[arg(short, long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: u32,
    },

    /// Remove every score from a running server's leaderboard
    Clear {
        #[command(flatten)]
        remote: RemoteArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Leaderboard { remote, limit } => print_leaderboard(&remote, limit).await,
        Commands::Clear { remote } => clear(&remote).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from(&args);
    if config.console {
        init_file_logging(&args.log_file)?;
    } else {
        init_logging();
    }
    server::run(config).await
}

async fn print_leaderboard(remote: &RemoteArgs, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let mut client = QuizClient::connect(&remote.url()).await?;
    let entries = client.leaderboard(Some(limit)).await?;
    client.close().await?;

    if entries.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

async fn clear(remote: &RemoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let mut client = QuizClient::connect(&remote.url()).await?;
    client.clear_leaderboard().await?;
    client.close().await?;
    println!("Leaderboard cleared.");
    Ok(())
}

fn format_entry(entry: &LeaderboardEntry) -> String {
    format!(
        "{:>3}. {:<24} {:>3}/{:<3} {}",
        entry.rank,
        entry.player_name,
        entry.score,
        entry.total_questions,
        entry.recorded_at.format("%Y-%m-%d %H:%M:%S")
    )
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quiz_board=info"))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The console owns the terminal, so logs go to a file instead.
fn init_file_logging(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
