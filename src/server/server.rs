//! WebSocket server implementation.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::data::{builtin_catalog, load_catalog_from_json};
use crate::protocol::{ClientMessage, LeaderboardEntry, ServerMessage};
use crate::service::QuizService;
use crate::store::open_store;
use crate::terminal;

use super::commands::{CommandResult, execute_command, refresh_leaderboard};
use super::state::{ConsoleState, ConsoleView};
use super::ui;

/// How long a new connection may take to complete the WebSocket upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the quiz server until the host quits (console) or Ctrl-C (headless).
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = match &config.questions {
        Some(path) => load_catalog_from_json(path)?,
        None => builtin_catalog()?,
    };
    info!(questions = catalog.len(), "question catalog ready");

    let store = open_store(&config.database).await?;
    let service = QuizService::new(catalog, store);

    let server = QuizServer::bind(config.addr, service.clone()).await?;
    let addr = server.local_addr()?;
    info!(%addr, store = service.store_name(), "server listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let accept_task = tokio::spawn(server.serve(shutdown_rx));

    if config.console {
        run_console(&service, addr).await?;
    } else {
        tokio::signal::ctrl_c().await?;
        info!("interrupt received");
    }

    info!("shutting down");
    let _ = shutdown_tx.send(true);
    let _ = accept_task.await;
    Ok(())
}

/// A bound listener that serves quiz requests over WebSocket.
pub struct QuizServer {
    listener: TcpListener,
    service: QuizService,
}

impl QuizServer {
    pub async fn bind(addr: SocketAddr, service: QuizService) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, service })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` flips to true. Open connections
    /// are told the server is closing.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) {
        let service = Arc::new(self.service);
        let mut connections = tokio::task::JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let span = info_span!("connection", id = %Uuid::new_v4(), peer = %addr);
                        connections.spawn(
                            handle_connection(stream, Arc::clone(&service), shutdown.clone())
                                .instrument(span),
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                // Reap finished connections so the set does not grow forever.
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        while connections.join_next().await.is_some() {}
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    service: Arc<QuizService>,
    mut shutdown: watch::Receiver<bool>,
) {
    let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, tokio_tungstenite::accept_async(stream));
    let ws_stream = tokio::select! {
        accepted = handshake => match accepted {
            Ok(Ok(ws)) => ws,
            Ok(Err(e)) => {
                warn!(error = %e, "WebSocket handshake failed");
                return;
            }
            Err(_) => {
                warn!(timeout = ?HANDSHAKE_TIMEOUT, "WebSocket handshake timed out");
                return;
            }
        },
        Ok(_) = shutdown.wait_for(|closing| *closing) => {
            debug!("shutdown before handshake completed");
            return;
        }
    };
    debug!("client connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for sending messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Forward messages from channel to WebSocket
    let send_task = tokio::spawn(
        async move {
            while let Some(msg) = rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!(error = %e, "failed to encode reply");
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = ws_sender.close().await;
        }
        .in_current_span(),
    );

    let _ = tx.send(ServerMessage::ConnectionAck);

    loop {
        let msg = tokio::select! {
            msg = ws_receiver.next() => msg,
            Ok(()) = shutdown.changed() => {
                if !*shutdown.borrow() {
                    continue;
                }
                let _ = tx.send(ServerMessage::ServerClosing);
                break;
            }
        };

        let text = match msg {
            Some(Ok(Message::Text(text))) => text.to_string(),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                debug!(error = %e, "connection error");
                break;
            }
            Some(Ok(_)) => continue,
        };

        let reply = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(request) => handle_request(&service, request).await,
            Err(e) => {
                warn!(error = %e, "malformed request");
                ServerMessage::bad_request(format!("malformed request: {}", e))
            }
        };

        if tx.send(reply).is_err() {
            break;
        }
    }

    // Let queued replies flush before the socket closes.
    drop(tx);
    let _ = send_task.await;
    debug!("client disconnected");
}

/// Answer one client request.
pub async fn handle_request(service: &QuizService, request: ClientMessage) -> ServerMessage {
    match request {
        ClientMessage::GetQuestions => ServerMessage::Questions {
            questions: service.questions(),
        },
        ClientMessage::SubmitAnswers {
            player_name,
            answers,
        } => match service.submit_answers(&player_name, &answers).await {
            Ok(submission) => submission.into(),
            Err(e) => ServerMessage::from(&e),
        },
        ClientMessage::GetLeaderboard { limit } => match service.leaderboard(limit).await {
            Ok(records) => ServerMessage::Leaderboard {
                entries: LeaderboardEntry::rank_all(records),
            },
            Err(e) => ServerMessage::from(&e),
        },
        ClientMessage::ClearLeaderboard => match service.clear_leaderboard().await {
            Ok(()) => ServerMessage::LeaderboardCleared,
            Err(e) => ServerMessage::from(&e),
        },
    }
}

/// Run the host console.
async fn run_console(
    service: &QuizService,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = service.subscribe();
    let mut state = ConsoleState::new(addr, service.store_name(), service.catalog().len());
    let mut terminal = terminal::init()?;

    loop {
        // Drain leaderboard changes published since the last frame
        loop {
            match events.try_recv() {
                Ok(event) => state.record_event(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    state.add_to_history(format!("Missed {} updates", missed));
                    state.leaderboard_stale = true;
                }
                Err(_) => break,
            }
        }

        if state.leaderboard_stale {
            if let CommandResult::Error(msg) = refresh_leaderboard(service, &mut state).await {
                state.add_to_history(format!("Error: {}", msg));
            }
        }

        if state.should_quit {
            break;
        }

        terminal.draw(|frame| ui::render(frame, &state))?;

        // Handle input with timeout to allow for periodic updates
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if handle_input(service, &mut state, key.code).await {
                    break;
                }
            }
        }
    }

    terminal.restore()?;
    Ok(())
}

/// Handle keyboard input for the console. Returns true when the host quits.
async fn handle_input(service: &QuizService, state: &mut ConsoleState, key: KeyCode) -> bool {
    // If in Help view, Esc or Enter returns to previous view
    if state.current_view == ConsoleView::Help {
        if matches!(key, KeyCode::Esc | KeyCode::Enter) {
            state.close_help();
        }
        return false;
    }

    match key {
        KeyCode::Char(c) => {
            state.command_input.push(c);
        }
        KeyCode::Backspace => {
            state.command_input.pop();
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut state.command_input);
            match execute_command(service, state, &input).await {
                CommandResult::Ok(Some(msg)) => state.add_to_history(msg),
                CommandResult::Ok(None) => {}
                CommandResult::Error(msg) => state.add_to_history(format!("Error: {}", msg)),
                CommandResult::Quit => return true,
            }
        }
        KeyCode::Esc => {
            state.command_input.clear();
        }
        KeyCode::Tab => {
            let next = match state.current_view {
                ConsoleView::Leaderboard => ConsoleView::Activity,
                ConsoleView::Activity | ConsoleView::Help => ConsoleView::Leaderboard,
            };
            state.show(next);
        }
        _ => {}
    }

    false
}
