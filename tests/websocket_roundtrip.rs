//! End-to-end tests over a real WebSocket connection.
//!
//! Each test binds a server on an ephemeral port with an in-memory
//! leaderboard and talks to it through the public client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use quiz_board::protocol::{ErrorKind, ServerMessage};
use quiz_board::{
    Answer, ClientError, MemoryScoreStore, QuizClient, QuizService, SubmitOutcome,
    builtin_catalog, server::QuizServer,
};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

struct TestServer {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let service = QuizService::new(builtin_catalog().unwrap(), Arc::new(MemoryScoreStore::new()));
        let server = QuizServer::bind("127.0.0.1:0".parse().unwrap(), service)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(server.serve(shutdown_rx));
        Self { addr, shutdown, task }
    }

    fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    async fn stop(self) {
        self.shutdown.send(true).unwrap();
        self.task.await.unwrap();
    }
}

/// Answers for every catalog question, the first `correct` of them right.
fn answers(correct: usize) -> Vec<Answer> {
    let catalog = builtin_catalog().unwrap();
    catalog
        .questions()
        .iter()
        .enumerate()
        .map(|(i, q)| {
            if i < correct {
                Answer::new(q.id, q.correct_answer.clone())
            } else {
                Answer::new(q.id, "definitely not an option")
            }
        })
        .collect()
}

#[tokio::test]
async fn test_questions_hide_answers() {
    let server = TestServer::start().await;
    let mut client = QuizClient::connect(&server.url()).await.unwrap();
    let questions = client.questions().await.unwrap();
    assert_eq!(questions.len(), builtin_catalog().unwrap().len());
    client.close().await.unwrap();

    let (mut ws, _) = tokio_tungstenite::connect_async(server.url()).await.unwrap();
    next_frame(&mut ws).await;
    ws.send(Message::Text("{\"type\":\"GetQuestions\"}".into()))
        .await
        .unwrap();
    let frame: serde_json::Value = serde_json::from_str(&next_frame(&mut ws).await).unwrap();
    let first = &frame["questions"][0];
    assert!(first.get("prompt").is_some());
    assert!(first.get("correctAnswer").is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_submit_and_rank() {
    let server = TestServer::start().await;
    let mut client = QuizClient::connect(&server.url()).await.unwrap();

    let reply = client.submit("alice", answers(7)).await.unwrap();
    assert_eq!(reply.score, 7);
    assert_eq!(reply.total_questions, 10);
    assert_eq!(reply.results.len(), 10);
    assert_eq!(reply.outcome, SubmitOutcome::Created);

    let reply = client.submit("bob", answers(9)).await.unwrap();
    assert_eq!(reply.outcome, SubmitOutcome::Created);

    // A worse attempt is still scored but leaves the board alone.
    let reply = client.submit("alice", answers(3)).await.unwrap();
    assert_eq!(reply.score, 3);
    assert_eq!(reply.outcome, SubmitOutcome::Unchanged);

    let entries = client.leaderboard(None).await.unwrap();
    let board: Vec<_> = entries
        .iter()
        .map(|e| (e.rank, e.player_name.as_str(), e.score))
        .collect();
    assert_eq!(board, vec![(1, "bob", 9), (2, "alice", 7)]);

    let reply = client.submit("alice", answers(10)).await.unwrap();
    assert_eq!(reply.outcome, SubmitOutcome::Updated);
    let entries = client.leaderboard(Some(1)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].player_name, "alice");
    assert_eq!(entries[0].score, 10);

    client.close().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let server = TestServer::start().await;
    let mut client = QuizClient::connect(&server.url()).await.unwrap();

    let err = client.submit("   ", answers(10)).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Rejected {
            kind: ErrorKind::Validation,
            ..
        }
    ));
    assert!(client.leaderboard(None).await.unwrap().is_empty());

    client.close().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_clear_leaderboard() {
    let server = TestServer::start().await;
    let mut client = QuizClient::connect(&server.url()).await.unwrap();

    client.submit("alice", answers(5)).await.unwrap();
    client.submit("bob", answers(6)).await.unwrap();
    client.clear_leaderboard().await.unwrap();
    assert!(client.leaderboard(None).await.unwrap().is_empty());

    // Clearing an empty board is fine.
    client.clear_leaderboard().await.unwrap();

    let reply = client.submit("alice", answers(1)).await.unwrap();
    assert_eq!(reply.outcome, SubmitOutcome::Created);

    client.close().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_malformed_frame_gets_bad_request() {
    let server = TestServer::start().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(server.url()).await.unwrap();

    let ack = next_message(&mut ws).await;
    assert_eq!(ack, ServerMessage::ConnectionAck);

    ws.send(Message::Text("{\"type\":\"nope\"}".into()))
        .await
        .unwrap();
    match next_message(&mut ws).await {
        ServerMessage::Error { kind, .. } => assert_eq!(kind, ErrorKind::BadRequest),
        other => panic!("expected error reply, got {:?}", other),
    }

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_notifies_clients() {
    let server = TestServer::start().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(server.url()).await.unwrap();
    assert_eq!(next_message(&mut ws).await, ServerMessage::ConnectionAck);

    server.shutdown.send(true).unwrap();
    assert_eq!(next_message(&mut ws).await, ServerMessage::ServerClosing);

    server.task.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_with_idle_tcp_connection() {
    let server = TestServer::start().await;

    // Connected but never sends the WebSocket upgrade.
    let _idle = TcpStream::connect(server.addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    server.shutdown.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("server did not shut down")
        .unwrap();
}

async fn next_message<S>(ws: &mut S) -> ServerMessage
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    serde_json::from_str(&next_frame(ws).await).unwrap()
}

async fn next_frame<S>(ws: &mut S) -> String
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text.to_string(),
            Some(Ok(_)) => continue,
            other => panic!("connection ended: {:?}", other),
        }
    }
}
