//! The player's input stream.
//!
//! Reading a terminal blocks, and a blocked `read` cannot be interrupted.
//! [`CommandSource`] therefore reads on a dedicated OS thread and hands lines
//! to the async side over a channel with room for a single line: the reader
//! never runs more than one line ahead of the event loop.
//!
//! After [`stop`](CommandSource::stop) the reader may still be parked in
//! `read`; whatever it returns with is thrown away.

use std::io::{self, BufRead, BufReader};
use std::thread;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lines typed by the player, one at a time.
#[derive(Debug)]
pub struct CommandSource {
    lines: mpsc::Receiver<String>,
    stop: CancellationToken,
}

impl CommandSource {
    /// Starts reading `reader` on a background thread.
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, lines) = mpsc::channel(1);
        let stop = CancellationToken::new();
        let token = stop.clone();

        thread::Builder::new()
            .name("tengen-input".into())
            .spawn(move || read_lines(reader, tx, token))?;

        Ok(Self { lines, stop })
    }

    /// Reads the process's standard input.
    pub fn stdin() -> io::Result<Self> {
        Self::spawn(BufReader::new(io::stdin()))
    }

    /// The next line, without its line terminator. `None` once the input
    /// has ended or the source was stopped.
    pub async fn next_line(&mut self) -> Option<String> {
        if self.stop.is_cancelled() {
            return None;
        }
        self.lines.recv().await
    }

    /// Stops delivery. Lines read after this point are never observed.
    pub fn stop(&mut self) {
        if self.stop.is_cancelled() {
            return;
        }
        tracing::debug!("stopping command source");
        self.stop.cancel();
        self.lines.close();
    }
}

impl Drop for CommandSource {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

fn read_lines<R: BufRead>(mut reader: R, tx: mpsc::Sender<String>, stop: CancellationToken) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                break;
            }
        }
        if stop.is_cancelled() {
            break;
        }
        // Bytes that aren't UTF-8 still make a line; the parser rejects it.
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        if tx.blocking_send(line).is_err() {
            break;
        }
    }
    tracing::debug!("input reader finished");
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[tokio::test]
    async fn test_lines_arrive_in_order_then_end() {
        let mut source = CommandSource::spawn(Cursor::new("j\n3 4\r\nq")).unwrap();

        assert_eq!(source.next_line().await.as_deref(), Some("j"));
        assert_eq!(source.next_line().await.as_deref(), Some("3 4"));
        assert_eq!(source.next_line().await.as_deref(), Some("q"));
        assert_eq!(source.next_line().await, None);
    }

    #[tokio::test]
    async fn test_stop_hides_unread_lines() {
        let mut source = CommandSource::spawn(Cursor::new("a\nb\nc\n")).unwrap();
        assert_eq!(source.next_line().await.as_deref(), Some("a"));

        source.stop();
        source.stop();

        assert_eq!(source.next_line().await, None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_input() {
        let mut source = CommandSource::spawn(Cursor::new(b"\xff\xfe\nj\nq\n".to_vec())).unwrap();

        let garbled = source.next_line().await.expect("garbled line is delivered");
        assert!(garbled.contains('\u{FFFD}'));
        assert_eq!(source.next_line().await.as_deref(), Some("j"));
        assert_eq!(source.next_line().await.as_deref(), Some("q"));
        assert_eq!(source.next_line().await, None);
    }

    #[tokio::test]
    async fn test_empty_input_ends_immediately() {
        let mut source = CommandSource::spawn(Cursor::new("")).unwrap();
        assert_eq!(source.next_line().await, None);
    }
}
