//! Tunables for the executor and the shell filter.

use std::time::Duration;

use crate::shell::SystemShell;

/// Settings shared by the executor, the CLI commands and the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program used to run `|cmd` filters, as `<shell> -c <cmd>`.
    pub shell: String,
    /// How long a filter may run before it is killed.
    pub pipe_timeout: Duration,
    /// Output of at most this many lines goes to the status line.
    pub short_output_lines: usize,
    /// Width of the one-line summary reported for region commands.
    pub summary_width: usize,
    /// Scratch buffer that receives long output.
    pub output_buffer: String,
    /// Scratch buffer that receives the help text.
    pub help_buffer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            pipe_timeout: Duration::from_secs(10),
            short_output_lines: 3,
            summary_width: 80,
            output_buffer: "*sam-output*".to_string(),
            help_buffer: "*sam-help*".to_string(),
        }
    }
}

impl Config {
    pub fn system_shell(&self) -> SystemShell {
        SystemShell::new(self.shell.clone(), self.pipe_timeout)
    }
}
