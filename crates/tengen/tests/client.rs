//! Integration tests for the Tengen client: full connection flow against an
//! in-process mock of the game service.

use std::io::Cursor;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tengen::prelude::*;
use tengen_protocol::{Body, ColourState, Envelope, ErrorCode, Reply, Request};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Mock game service
// =========================================================================

struct MockService {
    port: u16,
    requests: mpsc::UnboundedReceiver<Request>,
}

impl MockService {
    /// Every request received so far, in order.
    fn drain(&mut self) -> Vec<Request> {
        let mut seen = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            seen.push(request);
        }
        seen
    }
}

fn answer(request: &Request) -> Reply {
    match request {
        Request::Handshake { password, .. } if password != "secret" => Reply::Error {
            code: ErrorCode::Unauthenticated,
            message: "bad credentials".into(),
        },
        Request::JoinGame | Request::WaitTurn | Request::MakeTurn { .. } => Reply::State {
            snapshot: GameSnapshot {
                size: 9,
                komi: 6.5,
                black: ColourState::default(),
                white: ColourState::default(),
            },
        },
        _ => Reply::Ack,
    }
}

async fn start() -> MockService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, requests) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                break;
            }
            let env: Envelope = serde_json::from_slice(&msg.into_data()).unwrap();
            let Body::Request(request) = env.body else {
                continue;
            };
            let reply = Envelope::reply(env.id, answer(&request));
            let _ = tx.send(request);
            let bytes = serde_json::to_vec(&reply).unwrap();
            if ws.send(Message::Binary(bytes.into())).await.is_err() {
                break;
            }
        }
    });

    MockService { port, requests }
}

fn builder(mock: &MockService, password: &str) -> TengenClientBuilder {
    TengenClient::builder()
        .address("127.0.0.1")
        .port(mock.port)
        .credentials(Credentials::new("alice", password))
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_play_enters_and_leaves_the_lobby() {
    let mut mock = start().await;
    let client = builder(&mock, "secret").connect().await.unwrap();
    let mut commands = CommandSource::spawn(Cursor::new("q\n")).unwrap();
    let mut out = Vec::new();

    let reason = tokio::time::timeout(
        Duration::from_secs(2),
        client.play(&mut commands, std::future::pending(), &mut out),
    )
    .await
    .expect("sitting should end")
    .unwrap();

    assert_eq!(reason, ExitReason::Quit);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Welcome to a Go game"));
    assert!(text.contains("Select a type of game"));

    let requests = mock.drain();
    assert!(matches!(requests[0], Request::Handshake { .. }));
    assert_eq!(requests[1..], [Request::EnterLobby, Request::LeaveLobby]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_shutdown_signal_ends_the_sitting() {
    let mock = start().await;
    let client = builder(&mock, "secret").connect().await.unwrap();
    // Input that never ends.
    let (_keep_open, reader) = std::os::unix::net::UnixStream::pair().unwrap();
    let mut commands = CommandSource::spawn(std::io::BufReader::new(reader)).unwrap();
    let mut out = Vec::new();

    let reason = tokio::time::timeout(
        Duration::from_secs(2),
        client.play(
            &mut commands,
            tokio::time::sleep(Duration::from_millis(50)),
            &mut out,
        ),
    )
    .await
    .expect("sitting should end")
    .unwrap();

    assert_eq!(reason, ExitReason::Shutdown);
}

#[tokio::test]
async fn test_register_sends_register_user() {
    let mut mock = start().await;
    let client = builder(&mock, "secret").connect().await.unwrap();

    client.register().await.unwrap();

    let requests = mock.drain();
    assert_eq!(requests.last(), Some(&Request::RegisterUser));
}

#[tokio::test]
async fn test_wrong_password_fails_to_connect() {
    let mock = start().await;

    let err = builder(&mock, "guess").connect().await.err().unwrap();

    assert!(matches!(err, TengenError::Service(_)));
    assert!(err.to_string().contains("bad credentials"));
}

#[tokio::test]
async fn test_connection_refused_is_fatal() {
    // Bind and drop to get a port nobody listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = TengenClient::builder()
        .address("127.0.0.1")
        .port(port)
        .credentials(Credentials::new("alice", "secret"))
        .connect()
        .await
        .err()
        .unwrap();

    assert!(matches!(err, TengenError::Service(_)));
}
