//! The editor-side collaborators the executor talks to.
//!
//! Provides the `Host` and `ShellFilter` traits, and (under test) a recording
//! `MockHost` and a scripted `MockShell`.

use crate::error::SamError;

/// The editor hosting the interpreter: one current buffer plus a status line.
pub trait Host {
    /// The text of the current buffer. Fails with [`SamError::NoBuffer`] if none is active.
    fn buffer_contents(&self) -> Result<String, SamError>;

    /// Replace the whole current buffer.
    fn replace_buffer_contents(&mut self, text: &str) -> Result<(), SamError>;

    /// Ask the user for one line of input. `None` means the prompt was cancelled.
    fn prompt(&mut self, label: &str) -> Option<String>;

    /// Show `contents` in the scratch buffer `name`, creating it if needed.
    fn show_named_buffer(&mut self, name: &str, contents: &str);

    /// Show a single-line status message.
    fn message(&mut self, text: &str);
}

/// Runs a shell filter: feeds `input` to `command` and captures its output.
pub trait ShellFilter {
    fn run(&self, command: &str, input: &str) -> Result<String, SamError>;
}
