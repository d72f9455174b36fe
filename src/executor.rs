//! The entry point hosts call: parse, evaluate against the current buffer,
//! write the result back, and tell the user what happened.

use tracing::info;

use crate::command::Command;
use crate::config::Config;
use crate::error::SamError;
use crate::exec_context::Evaluation;
use crate::host::{Host, ShellFilter};
use crate::interpreter::evaluate;
use crate::parser::parse;
use crate::snapshot::Snapshot;

/// What a successful invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The buffer was rewritten by `count` changes.
    Changed { count: usize },
    /// Nothing changed; `lines` lines of output were shown.
    Printed { lines: usize },
    /// Every pipe that ran failed; the failures have been reported.
    PipeFailed { failures: usize },
    /// No changes and no output.
    NoMatches,
}

pub struct Executor {
    config: Config,
    shell: Box<dyn ShellFilter>,
}

impl Executor {
    /// An executor that runs filters through the configured system shell.
    pub fn new(config: Config) -> Self {
        let shell = config.system_shell();
        Self::with_shell(config, shell)
    }

    pub fn with_shell(config: Config, shell: impl ShellFilter + 'static) -> Self {
        Self {
            config,
            shell: Box::new(shell),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `input` over the whole current buffer.
    ///
    /// Nothing is written back unless the whole command tree evaluates without
    /// a fatal error.
    pub fn execute(&self, host: &mut dyn Host, input: &str) -> Result<Outcome, SamError> {
        let command = parse_input(input)?;
        let snapshot = Snapshot::new(host.buffer_contents()?);
        let evaluation = evaluate(&command, &snapshot, snapshot.whole(), self.shell.as_ref())?;
        report_pipe_failures(host, &evaluation);

        if evaluation.has_changes() {
            return commit(host, &snapshot, &evaluation);
        }
        if !evaluation.output.is_empty() {
            let lines = evaluation.output_lines();
            if lines <= self.config.short_output_lines {
                let output = evaluation.output.strip_suffix('\n').unwrap_or(&evaluation.output);
                host.message(output);
            } else {
                host.show_named_buffer(&self.config.output_buffer, &evaluation.output);
                host.message(&format!("{lines} lines of output"));
            }
            return Ok(Outcome::Printed { lines });
        }
        Ok(nothing_happened(host, &evaluation))
    }

    /// Run `input` over `start..end` of the current buffer.
    ///
    /// The range is clamped to the buffer and reordered if reversed. Output is
    /// reported as a single truncated line.
    pub fn execute_on_region(
        &self,
        host: &mut dyn Host,
        input: &str,
        start: usize,
        end: usize,
    ) -> Result<Outcome, SamError> {
        let command = parse_input(input)?;
        let snapshot = Snapshot::new(host.buffer_contents()?);
        let region = snapshot.clamp_region(start, end);
        let evaluation = evaluate(&command, &snapshot, region, self.shell.as_ref())?;
        report_pipe_failures(host, &evaluation);

        let outcome = if evaluation.has_changes() {
            commit(host, &snapshot, &evaluation)?
        } else if evaluation.output.is_empty() {
            return Ok(nothing_happened(host, &evaluation));
        } else {
            Outcome::Printed {
                lines: evaluation.output_lines(),
            }
        };
        if !evaluation.output.is_empty() {
            host.message(&summarize(&evaluation.output, self.config.summary_width));
        }
        Ok(outcome)
    }
}

fn parse_input(input: &str) -> Result<Command, SamError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SamError::EmptyCommand);
    }
    parse(input)
}

fn commit(
    host: &mut dyn Host,
    snapshot: &Snapshot,
    evaluation: &Evaluation,
) -> Result<Outcome, SamError> {
    let text = evaluation.apply(snapshot)?;
    host.replace_buffer_contents(&text)?;
    let count = evaluation.changes.len();
    info!(count, "applied changes");
    host.message(&format!("{count} change(s) applied"));
    Ok(Outcome::Changed { count })
}

fn report_pipe_failures(host: &mut dyn Host, evaluation: &Evaluation) {
    for failure in &evaluation.pipe_failures {
        host.message(&format!("Error: {failure}"));
    }
}

fn nothing_happened(host: &mut dyn Host, evaluation: &Evaluation) -> Outcome {
    if evaluation.pipe_failures.is_empty() {
        host.message("No matches");
        Outcome::NoMatches
    } else {
        Outcome::PipeFailed {
            failures: evaluation.pipe_failures.len(),
        }
    }
}

/// The first line of `output`, cut to `width` characters, with `...` if anything was left out.
fn summarize(output: &str, width: usize) -> String {
    let mut lines = output.lines();
    let first = lines.next().unwrap_or_default();
    let mut summary: String = first.chars().take(width).collect();
    if first.chars().count() > width || lines.next().is_some() {
        summary.push_str("...");
    }
    summary
}
