//! Line-oriented host for the `samedit` binary.
//!
//! Holds one in-memory buffer, reads prompts and commands from an input
//! stream, prints scratch buffers to the output stream and status messages to
//! the status stream. `TerminalHost::stdio` wires these to stdin, stdout and
//! stderr, colouring errors when stderr is a terminal.

use std::io::{self, BufRead, Stderr, StdinLock, Stdout, Write};

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::tty::IsTty;
use tracing::warn;

use crate::error::SamError;
use crate::host::Host;

pub struct TerminalHost<I, O, E> {
    buffer: String,
    modified: bool,
    input: I,
    output: O,
    status: E,
    styled: bool,
}

pub type StdioHost = TerminalHost<StdinLock<'static>, Stdout, Stderr>;

impl StdioHost {
    pub fn stdio(text: String) -> Self {
        let status = io::stderr();
        let styled = status.is_tty();
        Self::new(text, io::stdin().lock(), io::stdout(), status, styled)
    }
}

impl<I: BufRead, O: Write, E: Write> TerminalHost<I, O, E> {
    pub fn new(text: String, input: I, output: O, status: E, styled: bool) -> Self {
        Self {
            buffer: text,
            modified: false,
            input,
            output,
            status,
            styled,
        }
    }

    /// True once any command has rewritten the buffer.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn into_contents(self) -> String {
        self.buffer
    }

    /// Show `label` on the status stream and read one line of input, without
    /// its line terminator. `None` at end of input.
    pub fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.status, "{label}")?;
        self.status.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

impl<I: BufRead, O: Write, E: Write> Host for TerminalHost<I, O, E> {
    fn buffer_contents(&self) -> Result<String, SamError> {
        Ok(self.buffer.clone())
    }

    fn replace_buffer_contents(&mut self, text: &str) -> Result<(), SamError> {
        if self.buffer != text {
            self.buffer = text.to_string();
            self.modified = true;
        }
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> Option<String> {
        self.read_line(label).unwrap_or_else(|err| {
            warn!(%err, "prompt failed");
            None
        })
    }

    fn show_named_buffer(&mut self, name: &str, contents: &str) {
        let newline = if contents.ends_with('\n') || contents.is_empty() {
            ""
        } else {
            "\n"
        };
        write!(self.output, "--- {name} ---\n{contents}{newline}").ok();
        self.output.flush().ok();
    }

    fn message(&mut self, text: &str) {
        if self.styled && text.starts_with("Error:") {
            crossterm::execute!(
                self.status,
                SetForegroundColor(Color::Red),
                Print(text),
                ResetColor,
                Print('\n')
            )
            .ok();
        } else {
            writeln!(self.status, "{text}").ok();
        }
    }
}
