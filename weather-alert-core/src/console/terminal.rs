use async_trait::async_trait;
use crossterm::{
    Command,
    cursor::{MoveTo, RestorePosition, SavePosition},
    queue,
    style::Print,
    terminal::{self, Clear, ClearType, ScrollUp},
};
use std::{
    fmt,
    io::{self, Stdout, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::warn;

use super::{Console, LineReader};

/// Fixed-size viewport: log lines scroll in the rows above, input stays on
/// the bottom row.
///
/// The terminal size is captured once. Every operation takes the viewport lock
/// for its whole cursor sequence, so concurrent writers cannot interleave.
#[derive(Debug)]
pub struct TerminalConsole<W: Write + Send> {
    viewport: Mutex<Viewport<W>>,
    input: LineReader,
}

#[derive(Debug)]
struct Viewport<W> {
    out: W,
    width: u16,
    input_row: u16,
}

impl TerminalConsole<Stdout> {
    pub fn stdout(input: LineReader) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::new(io::stdout(), width, height, input)
    }
}

impl<W: Write + Send> TerminalConsole<W> {
    pub fn new(out: W, width: u16, height: u16, input: LineReader) -> io::Result<Self> {
        // At least one log row above the input row.
        let input_row = height.max(2) - 1;
        let mut viewport = Viewport { out, width: width.max(1), input_row };

        queue!(
            viewport.out,
            Clear(ClearType::All),
            SetScrollRegion { top: 0, bottom: input_row - 1 },
            MoveTo(0, input_row),
        )?;
        viewport.out.flush()?;

        Ok(Self { viewport: Mutex::new(viewport), input })
    }

    /// Give the whole screen back to the shell.
    pub fn restore(&self) -> io::Result<()> {
        let mut vp = self.lock();
        let row = vp.input_row;

        queue!(vp.out, ResetScrollRegion, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
        writeln!(vp.out)?;
        vp.out.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Viewport<W>> {
        self.viewport.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> Viewport<W> {
    fn write_log(&mut self, message: &str) -> io::Result<()> {
        let row = self.input_row - 1;
        let width = usize::from(self.width);

        queue!(self.out, SavePosition)?;
        for line in message_lines(message) {
            let line: String = line.chars().filter(|c| *c != '\r').take(width).collect();
            queue!(
                self.out,
                ScrollUp(1),
                MoveTo(0, row),
                Clear(ClearType::CurrentLine),
                Print(line)
            )?;
        }
        queue!(self.out, RestorePosition)?;
        self.out.flush()
    }

    fn write_prompt(&mut self, text: &str) -> io::Result<()> {
        let row = self.input_row;
        queue!(self.out, MoveTo(0, row), Clear(ClearType::CurrentLine), Print(text))?;
        self.out.flush()
    }
}

fn message_lines(message: &str) -> impl Iterator<Item = &str> {
    let empty = message.is_empty().then_some("");
    empty.into_iter().chain(message.lines())
}

#[async_trait]
impl<W: Write + Send> Console for TerminalConsole<W> {
    fn log_line(&self, message: &str) {
        if let Err(e) = self.lock().write_log(message) {
            warn!(error = %e, "console write failed");
        }
    }

    fn prompt_echo(&self, text: &str) {
        if let Err(e) = self.lock().write_prompt(text) {
            warn!(error = %e, "console write failed");
        }
    }

    async fn read_line(&self) -> String {
        self.input.next_line().await
    }

    fn input_closed(&self) -> bool {
        self.input.is_closed()
    }
}

/// DECSTBM: confine scrolling to rows `top..=bottom` (zero based).
struct SetScrollRegion {
    top: u16,
    bottom: u16,
}

impl Command for SetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b[{};{}r", self.top + 1, self.bottom + 1)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "scroll regions need an ANSI terminal"))
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

struct ResetScrollRegion;

impl Command for ResetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[r")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "scroll regions need an ANSI terminal"))
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}
