use async_trait::async_trait;
use std::{
    io::{self, Stdout, Write},
    sync::{Mutex, PoisonError},
};
use tracing::warn;

use super::{Console, LineReader};

/// Line-oriented console without cursor control, for pipes and one-shot runs.
#[derive(Debug)]
pub struct PlainConsole<W: Write + Send> {
    out: Mutex<W>,
    input: LineReader,
}

impl PlainConsole<Stdout> {
    pub fn stdout(input: LineReader) -> Self {
        Self::new(io::stdout(), input)
    }
}

impl<W: Write + Send> PlainConsole<W> {
    pub fn new(out: W, input: LineReader) -> Self {
        Self { out: Mutex::new(out), input }
    }

    fn write(&self, text: &str, newline: bool) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let result = if newline { writeln!(out, "{text}") } else { write!(out, "{text}") };

        if let Err(e) = result.and_then(|()| out.flush()) {
            warn!(error = %e, "console write failed");
        }
    }
}

#[async_trait]
impl<W: Write + Send> Console for PlainConsole<W> {
    fn log_line(&self, message: &str) {
        self.write(message.trim_end_matches('\n'), true);
    }

    fn prompt_echo(&self, text: &str) {
        self.write(text, false);
    }

    async fn read_line(&self) -> String {
        self.input.next_line().await
    }

    fn input_closed(&self) -> bool {
        self.input.is_closed()
    }
}
