//! Running `|cmd` filters through the system shell.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::SamError;
use crate::host::ShellFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs filters as `<program> -c <command>`, killing them after `timeout`.
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: String,
    timeout: Duration,
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new("sh", Duration::from_secs(10))
    }
}

impl SystemShell {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl ShellFilter for SystemShell {
    fn run(&self, command: &str, input: &str) -> Result<String, SamError> {
        let failed = |detail: String| SamError::Pipe {
            command: command.to_string(),
            detail,
        };
        debug!(program = %self.program, command, bytes = input.len(), "running filter");

        let mut child = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| failed(format!("cannot start {}: {err}", self.program)))?;

        // Feed stdin and drain both outputs on their own threads so a chatty
        // filter can never block on a full pipe while we wait for it.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(failed(format!(
                        "timed out after {:.1}s",
                        self.timeout.as_secs_f64()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => return Err(failed(err.to_string())),
            }
        };

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Err(err)) if err.kind() != io::ErrorKind::BrokenPipe => {
                    return Err(failed(format!("writing input: {err}")));
                }
                Err(_) => return Err(failed("input writer panicked".to_string())),
                _ => {}
            }
        }
        let output = collect(stdout).map_err(|err| failed(format!("reading output: {err}")))?;
        let errors = collect(stderr).map_err(|err| failed(format!("reading errors: {err}")))?;

        if !status.success() {
            let errors = String::from_utf8_lossy(&errors);
            let errors = errors.trim();
            return Err(failed(if errors.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {errors}")
            }));
        }
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

type Drain = thread::JoinHandle<io::Result<Vec<u8>>>;

fn drain(mut pipe: impl Read + Send + 'static) -> Drain {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<Drain>) -> io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("reader thread panicked"))?,
        None => Ok(Vec::new()),
    }
}
