//! Test helpers shared by the session integration tests.
//!
//! - [`ScriptedService`]: a `GameService` whose answers are fed by the test
//! - [`Keyboard`]: a blocking reader the test types lines into
//! - [`Screen`]: a `Write` sink the test can inspect while the loop runs
//! - [`FailAfter`]: a `Write` sink that breaks after a few writes

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, BufReader, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tengen_protocol::ErrorCode;
use tengen_service::{ColourState, GameService, GameSnapshot, Point, ServiceError};
use tengen_session::{CommandSource, WaitResult};
use tokio::sync::mpsc;

// =========================================================================
// ScriptedService
// =========================================================================

/// One call received by the scripted service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RegisterUser,
    EnterLobby,
    LeaveLobby,
    JoinGame,
    WaitTurn,
    MakeTurn(i64, i64),
    LeaveGame,
}

/// Answers for the two long waits. A wait blocks until the test sends its
/// result; with the sender dropped it blocks forever.
pub struct Feeds {
    pub join: mpsc::UnboundedSender<WaitResult>,
    pub turn: mpsc::UnboundedSender<WaitResult>,
}

pub struct ScriptedService {
    calls: Mutex<Vec<Call>>,
    joins: tokio::sync::Mutex<mpsc::UnboundedReceiver<WaitResult>>,
    turns: tokio::sync::Mutex<mpsc::UnboundedReceiver<WaitResult>>,
    moves: Mutex<VecDeque<Result<GameSnapshot, ServiceError>>>,
    fail_enter_lobby: Mutex<Option<ServiceError>>,
    fail_leave_lobby: Mutex<Option<ServiceError>>,
    fail_leave_game: Mutex<Option<ServiceError>>,
    /// Waits dropped before they produced a result.
    abandoned: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> (Arc<Self>, Feeds) {
        let (join, joins) = mpsc::unbounded_channel();
        let (turn, turns) = mpsc::unbounded_channel();
        let service = Self {
            calls: Mutex::new(Vec::new()),
            joins: tokio::sync::Mutex::new(joins),
            turns: tokio::sync::Mutex::new(turns),
            moves: Mutex::new(VecDeque::new()),
            fail_enter_lobby: Mutex::new(None),
            fail_leave_lobby: Mutex::new(None),
            fail_leave_game: Mutex::new(None),
            abandoned: AtomicUsize::new(0),
        };
        (Arc::new(service), Feeds { join, turn })
    }

    /// Queues the answer to the next `MakeTurn`.
    pub fn answer_move(&self, result: Result<GameSnapshot, ServiceError>) {
        self.moves.lock().unwrap().push_back(result);
    }

    pub fn fail_enter_lobby(&self, error: ServiceError) {
        *self.fail_enter_lobby.lock().unwrap() = Some(error);
    }

    pub fn fail_leave_lobby(&self, error: ServiceError) {
        *self.fail_leave_lobby.lock().unwrap() = Some(error);
    }

    pub fn fail_leave_game(&self, error: ServiceError) {
        *self.fail_leave_game.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Waits (briefly) until `call` has been received `n` times. Wait calls
    /// start on background tasks, so they show up a little later.
    pub async fn until_called(&self, call: Call, n: usize) {
        eventually(|| self.count(&call) >= n, &format!("{call:?} x{n}")).await;
    }

    /// Waits (briefly) until `n` waits have been dropped.
    pub async fn until_abandoned(&self, n: usize) {
        eventually(|| self.abandoned() >= n, "abandoned waits").await;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn wait_on(
        &self,
        feed: &tokio::sync::Mutex<mpsc::UnboundedReceiver<WaitResult>>,
    ) -> WaitResult {
        let mut guard = AbandonGuard {
            counter: &self.abandoned,
            armed: true,
        };
        let mut rx = feed.lock().await;
        let result = match rx.recv().await {
            Some(result) => result,
            None => std::future::pending().await,
        };
        guard.armed = false;
        result
    }
}

struct AbandonGuard<'a> {
    counter: &'a AtomicUsize,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl GameService for ScriptedService {
    async fn register_user(&self) -> Result<(), ServiceError> {
        self.record(Call::RegisterUser);
        Ok(())
    }

    async fn enter_lobby(&self) -> Result<(), ServiceError> {
        self.record(Call::EnterLobby);
        match self.fail_enter_lobby.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn leave_lobby(&self) -> Result<(), ServiceError> {
        self.record(Call::LeaveLobby);
        match self.fail_leave_lobby.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn join_game(&self) -> Result<GameSnapshot, ServiceError> {
        self.record(Call::JoinGame);
        self.wait_on(&self.joins).await
    }

    async fn wait_turn(&self) -> Result<GameSnapshot, ServiceError> {
        self.record(Call::WaitTurn);
        self.wait_on(&self.turns).await
    }

    async fn make_turn(&self, x: i64, y: i64) -> Result<GameSnapshot, ServiceError> {
        self.record(Call::MakeTurn(x, y));
        let next = self.moves.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(rejected("no scripted answer")))
    }

    async fn leave_game(&self) -> Result<(), ServiceError> {
        self.record(Call::LeaveGame);
        match self.fail_leave_game.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// A 9×9 board with `stones` black stones placed along the first row.
/// Different `stones` values give distinguishable snapshots.
pub fn board(stones: i64) -> GameSnapshot {
    GameSnapshot {
        size: 9,
        komi: 6.5,
        black: ColourState {
            stones_on_board: (1..=stones).map(|x| Point { x, y: 1 }).collect(),
            stones_in_cup: 41,
            ..ColourState::default()
        },
        white: ColourState {
            stones_in_cup: 40,
            ..ColourState::default()
        },
    }
}

pub fn rejected(message: &str) -> ServiceError {
    ServiceError::Rejected {
        code: ErrorCode::Internal,
        message: message.into(),
    }
}

pub fn game_over() -> ServiceError {
    ServiceError::Rejected {
        code: ErrorCode::FailedPrecondition,
        message: "game is over".into(),
    }
}

/// Polls `check` until it holds; panics after two seconds.
pub async fn eventually(check: impl Fn() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// =========================================================================
// Keyboard and Screen
// =========================================================================

/// Types lines into a [`CommandSource`]. Dropping it ends the input.
pub struct Keyboard {
    keys: std::sync::mpsc::Sender<Vec<u8>>,
}

impl Keyboard {
    pub fn new() -> (Self, CommandSource) {
        let (keys, rx) = std::sync::mpsc::channel();
        let reader = KeyReader {
            rx,
            pending: VecDeque::new(),
        };
        let source = CommandSource::spawn(BufReader::new(reader)).unwrap();
        (Self { keys }, source)
    }

    pub fn type_line(&self, line: &str) {
        self.keys.send(format!("{line}\n").into_bytes()).unwrap();
    }

    /// Types raw bytes, which need not be UTF-8.
    pub fn type_bytes(&self, bytes: &[u8]) {
        self.keys.send(bytes.to_vec()).unwrap();
    }
}

struct KeyReader {
    rx: std::sync::mpsc::Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl Read for KeyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv() {
                Ok(bytes) => self.pending.extend(bytes),
                // Keyboard dropped: end of input.
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// Output sink shared between the loop and the test.
#[derive(Clone, Default)]
pub struct Screen(Arc<Mutex<Vec<u8>>>);

impl Screen {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    pub async fn until_shows(&self, needle: &str) {
        eventually(|| self.contains(needle), needle).await;
    }
}

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts `n` writes, then fails every later one like a closed pipe.
pub struct FailAfter {
    left: usize,
    pub written: Vec<u8>,
}

impl FailAfter {
    pub fn new(n: usize) -> Self {
        Self {
            left: n,
            written: Vec::new(),
        }
    }
}

impl Write for FailAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.left == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        self.left -= 1;
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
