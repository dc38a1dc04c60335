//! WebSocket client implementation.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::models::{Answer, QuestionResult, QuestionView, SubmitOutcome};
use crate::protocol::{ClientMessage, ErrorKind, LeaderboardEntry, ServerMessage};

/// Errors raised by [`QuizClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("connection error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("invalid server message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("request rejected ({kind:?}): {message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("unexpected reply: {0}")]
    Unexpected(String),

    #[error("connection closed by server")]
    Closed,
}

/// Scoring output as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReply {
    pub score: u32,
    pub total_questions: u32,
    pub results: Vec<QuestionResult>,
    pub outcome: SubmitOutcome,
}

/// A request/response connection to a quiz server.
pub struct QuizClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl QuizClient {
    /// Connect to `url` (e.g. `ws://127.0.0.1:8712`) and wait for the
    /// server's acknowledgement.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|source| ClientError::Connect {
                url: url.to_string(),
                source,
            })?;

        let mut client = Self { ws };
        match client.receive().await? {
            ServerMessage::ConnectionAck => {
                debug!(%url, "connected");
                Ok(client)
            }
            other => Err(unexpected(other)),
        }
    }

    pub async fn questions(&mut self) -> Result<Vec<QuestionView>, ClientError> {
        match self.request(&ClientMessage::GetQuestions).await? {
            ServerMessage::Questions { questions } => Ok(questions),
            other => Err(unexpected(other)),
        }
    }

    pub async fn submit(
        &mut self,
        player_name: &str,
        answers: Vec<Answer>,
    ) -> Result<SubmitReply, ClientError> {
        let request = ClientMessage::SubmitAnswers {
            player_name: player_name.to_string(),
            answers,
        };
        match self.request(&request).await? {
            ServerMessage::SubmitResult {
                score,
                total_questions,
                results,
                outcome,
            } => Ok(SubmitReply {
                score,
                total_questions,
                results,
                outcome,
            }),
            other => Err(unexpected(other)),
        }
    }

    pub async fn leaderboard(
        &mut self,
        limit: Option<u32>,
    ) -> Result<Vec<LeaderboardEntry>, ClientError> {
        match self.request(&ClientMessage::GetLeaderboard { limit }).await? {
            ServerMessage::Leaderboard { entries } => Ok(entries),
            other => Err(unexpected(other)),
        }
    }

    pub async fn clear_leaderboard(&mut self) -> Result<(), ClientError> {
        match self.request(&ClientMessage::ClearLeaderboard).await? {
            ServerMessage::LeaderboardCleared => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Close the connection politely.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.ws.close(None).await?;
        Ok(())
    }

    /// Send `request` and wait for its reply. Error replies become
    /// [`ClientError::Rejected`].
    async fn request(&mut self, request: &ClientMessage) -> Result<ServerMessage, ClientError> {
        let json = serde_json::to_string(request)?;
        self.ws.send(Message::Text(json.into())).await?;

        match self.receive().await? {
            ServerMessage::Error { kind, message } => Err(ClientError::Rejected { kind, message }),
            ServerMessage::ServerClosing => Err(ClientError::Closed),
            reply => Ok(reply),
        }
    }

    async fn receive(&mut self) -> Result<ServerMessage, ClientError> {
        while let Some(msg) = self.ws.next().await {
            match msg? {
                Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
                Message::Close(_) => return Err(ClientError::Closed),
                _ => continue,
            }
        }
        Err(ClientError::Closed)
    }
}

fn unexpected(msg: ServerMessage) -> ClientError {
    ClientError::Unexpected(format!("{:?}", msg))
}
