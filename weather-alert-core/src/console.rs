//! Console access shared by the periodic and interactive loops.
//!
//! Every read and write goes through a [`Console`] handle. Implementations
//! serialize writers behind a single lock so a log line never lands in the
//! middle of a prompt or of another log line.

use async_trait::async_trait;
use std::{
    io::{self, BufRead},
    sync::atomic::{AtomicBool, Ordering},
    thread,
};
use tokio::sync::{Mutex, mpsc};
use tracing::warn;

pub mod plain;
pub mod terminal;

pub use plain::PlainConsole;
pub use terminal::TerminalConsole;

pub const HELP_TEXT: &str = "\
Type 'check' if you want to check current weather prediction for your location\n\
Type 'exit' if you want to exit\n\
Type 'help' for instructions\n";

#[async_trait]
pub trait Console: Send + Sync {
    /// Print a message above the input row.
    fn log_line(&self, message: &str);

    /// Write prompt text at the input row.
    fn prompt_echo(&self, text: &str);

    /// Next line of input, trimmed. Empty once input is exhausted.
    async fn read_line(&self) -> String;

    /// Whether the input source has reached end of file.
    fn input_closed(&self) -> bool {
        false
    }

    fn print_help(&self) {
        self.log_line(HELP_TEXT);
    }
}

/// Lines typed by the user, delivered over a channel.
///
/// Reading happens on a plain OS thread so an abandoned read never holds up
/// the async runtime.
#[derive(Debug)]
pub struct LineReader {
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
    closed: AtomicBool,
}

impl LineReader {
    pub fn new(rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self { rx: Mutex::new(rx), closed: AtomicBool::new(false) }
    }

    /// Forward stdin lines from a background thread.
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let spawned = thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || forward_lines(io::stdin().lock(), &tx));

        if let Err(e) = spawned {
            warn!(error = %e, "could not start stdin reader, input is closed");
        }

        Self::new(rx)
    }

    /// A reader with no input at all.
    pub fn closed() -> Self {
        let (_, rx) = mpsc::unbounded_channel();
        Self::new(rx)
    }

    pub async fn next_line(&self) -> String {
        let mut rx = self.rx.lock().await;
        match rx.recv().await {
            Some(line) => line.trim().to_string(),
            None => {
                self.closed.store(true, Ordering::Release);
                String::new()
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Send each line of `input` until end of file or a read error.
/// Invalid UTF-8 is replaced rather than treated as an error.
fn forward_lines(mut input: impl BufRead, tx: &mpsc::UnboundedSender<String>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                }
                if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "failed to read from stdin");
                break;
            }
        }
    }
}
